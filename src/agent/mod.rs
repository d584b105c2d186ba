//! # Agent Module
//!
//! The learning side of the training loop: a Deep Q-Network agent that
//! couples the value network with its replay memory.
//!
//! - **Epsilon-greedy exploration** with support for excluding actions at
//!   selection time
//! - **Experience replay** with uniform or reward-biased minibatch sampling
//! - **Target network** for stable bootstrapped targets (sync period 1
//!   reduces to plain online bootstrapping)

mod dqn;

pub use dqn::{DqnAgent, DqnAgentBuilder};
