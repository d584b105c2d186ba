use crate::agent::{DqnAgent, DqnAgentBuilder};
use crate::env::CartPole;
use crate::metrics::MetricsTracker;
use crate::optimizer::{OptimizerWrapper, SGD};
use crate::trainer::{Trainer, TrainerConfig};

fn small_agent() -> DqnAgent {
    DqnAgentBuilder::new()
        .layer_sizes(&[4, 16, 2])
        .memory_capacity(500)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .unwrap()
}

fn short_config() -> TrainerConfig {
    TrainerConfig {
        episodes: 5,
        max_steps: 50,
        batch_size: 8,
        ..TrainerConfig::default()
    }
}

#[test]
fn test_run_records_episodes() {
    let mut agent = small_agent();
    let mut tracker = MetricsTracker::new(100);
    let mut trainer = Trainer::new(CartPole::new(), short_config());

    trainer.run(&mut agent, &mut tracker).unwrap();

    assert_eq!(tracker.episode_count(), 5);
    assert_eq!(tracker.history().episode_lengths.len(), 5);
    for &length in tracker.history().episode_lengths.iter() {
        assert!(length >= 1 && length <= 50);
    }
}

#[test]
fn test_terminal_transitions_carry_configured_reward() {
    let mut agent = small_agent();
    let mut tracker = MetricsTracker::new(100);
    let mut config = short_config();
    config.episodes = 10;
    config.terminal_reward = -10.0;
    let mut trainer = Trainer::new(CartPole::new(), config);

    trainer.run(&mut agent, &mut tracker).unwrap();

    let mut saw_terminal = false;
    for transition in agent.memory.iter() {
        if transition.done {
            saw_terminal = true;
            assert_eq!(transition.reward, -10.0);
        } else {
            assert_eq!(transition.reward, 1.0);
        }
    }
    // An untrained policy fails well before a 50-step truncation, so some
    // episode must have terminated.
    assert!(saw_terminal);
}

#[test]
fn test_run_triggers_learning() {
    let mut agent = small_agent();
    let mut tracker = MetricsTracker::new(100);
    let mut config = short_config();
    config.episodes = 10;
    let mut trainer = Trainer::new(CartPole::new(), config);

    trainer.run(&mut agent, &mut tracker).unwrap();

    assert!(agent.learn_steps() > 0);
    assert!(!tracker.history().losses.is_empty());
    // Epsilon decayed from its starting value of 1.0
    assert!(agent.epsilon < 1.0);
}

#[test]
fn test_checkpointing_writes_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.bin");

    let mut agent = small_agent();
    let mut tracker = MetricsTracker::new(100);
    let mut config = short_config();
    config.checkpoint_path = Some(path.to_str().unwrap().to_string());
    config.checkpoint_every = 2;
    let mut trainer = Trainer::new(CartPole::new(), config);

    trainer.run(&mut agent, &mut tracker).unwrap();

    assert!(path.exists());
    DqnAgent::load(path.to_str().unwrap()).unwrap();
}

#[test]
fn test_evaluate_restores_epsilon() {
    let mut agent = small_agent();
    agent.epsilon = 0.37;
    let mut trainer = Trainer::new(CartPole::new(), short_config());

    let mean_length = trainer.evaluate(&mut agent, 3).unwrap();

    assert!(mean_length >= 1.0);
    assert!(mean_length <= 50.0);
    assert_eq!(agent.epsilon, 0.37);
}

#[test]
fn test_evaluate_zero_episodes() {
    let mut agent = small_agent();
    let mut trainer = Trainer::new(CartPole::new(), short_config());
    assert_eq!(trainer.evaluate(&mut agent, 0).unwrap(), 0.0);
}
