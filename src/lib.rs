//! # cartpole-dqn — Deep Q-Learning on a CartPole Simulator
//!
//! A compact reinforcement-learning crate: a Deep Q-Network agent with
//! experience replay, a small `ndarray`-backed feed-forward value network
//! trained by hand-rolled backpropagation, and a built-in CartPole
//! environment to learn on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cartpole_dqn::agent::DqnAgent;
//! use cartpole_dqn::env::CartPole;
//! use cartpole_dqn::metrics::MetricsTracker;
//! use cartpole_dqn::optimizer::{OptimizerWrapper, SGD};
//! use cartpole_dqn::trainer::{Trainer, TrainerConfig};
//!
//! let optimizer = OptimizerWrapper::SGD(SGD::new());
//! let mut agent = DqnAgent::new(&[4, 24, 24, 2], optimizer);
//!
//! let mut trainer = Trainer::new(CartPole::new(), TrainerConfig::default());
//! let mut tracker = MetricsTracker::new(1000);
//! trainer.run(&mut agent, &mut tracker).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Linear, Sigmoid, Tanh)
//! - [`agent`] - The DQN agent: epsilon-greedy selection, replay, learning
//! - [`env`] - The `Environment` trait and the CartPole simulator
//! - [`error`] - Error types and result handling
//! - [`layers`] - The dense layer underlying the value network
//! - [`metrics`] - Training history and progress statistics
//! - [`network`] - The feed-forward value-function approximator
//! - [`optimizer`] - SGD and Adam
//! - [`replay_buffer`] - Fixed-capacity experience replay
//! - [`trainer`] - The episode loop and greedy evaluation
//! - [`visualization`] - Progress plots and history export

pub mod activations;
pub mod agent;
pub mod env;
pub mod error;
pub mod layers;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;
pub mod visualization;

#[cfg(test)]
mod tests;
