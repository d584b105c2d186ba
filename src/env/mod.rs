//! # Environment Module
//!
//! The simulator side of the training loop. Environments expose gym-style
//! reset/step semantics over a fixed observation vector and a discrete
//! action space.

mod cartpole;

pub use cartpole::CartPole;

use ndarray::Array1;

/// A simulator with reset/step semantics.
///
/// `step` returns the next observation, the reward for the step, and whether
/// the episode terminated on this step.
pub trait Environment {
    /// Reset to an initial state and return the first observation.
    fn reset(&mut self) -> Array1<f32>;

    /// Advance the simulation by one action.
    fn step(&mut self, action: usize) -> (Array1<f32>, f32, bool);

    /// Length of the observation vector.
    fn observation_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_count(&self) -> usize;
}
