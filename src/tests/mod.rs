// Test modules for all components
pub mod test_activations;
pub mod test_agent;
pub mod test_env;
pub mod test_replay_buffer;
pub mod test_trainer;
