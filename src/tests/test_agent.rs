use crate::agent::{DqnAgent, DqnAgentBuilder};
use crate::optimizer::{OptimizerWrapper, SGD};
use crate::replay_buffer::{SamplingStrategy, Transition};
use ndarray::array;

fn agent() -> DqnAgent {
    DqnAgent::new(&[4, 16, 16, 3], OptimizerWrapper::SGD(SGD::new()))
}

fn transition(id: f32, reward: f32, done: bool) -> Transition {
    Transition {
        state: array![id, 0.0, 0.0, 0.0],
        action: 0,
        reward,
        next_state: array![id + 1.0, 0.0, 0.0, 0.0],
        done,
    }
}

#[test]
fn test_act_returns_valid_action() {
    let mut agent = agent();
    let state = array![0.1, 0.2, 0.3, 0.4];
    for _ in 0..50 {
        let action = agent.act(state.view(), &[]).unwrap();
        assert!(action < 3);
    }
}

#[test]
fn test_act_never_returns_excluded_action_exploring() {
    let mut agent = agent();
    agent.epsilon = 1.0;
    let state = array![0.1, 0.2, 0.3, 0.4];

    for _ in 0..200 {
        let action = agent.act(state.view(), &[1]).unwrap();
        assert_ne!(action, 1);
    }
}

#[test]
fn test_act_never_returns_excluded_action_greedy() {
    let mut agent = agent();
    agent.epsilon = 0.0;
    let state = array![0.1, 0.2, 0.3, 0.4];

    for _ in 0..200 {
        let action = agent.act(state.view(), &[0, 2]).unwrap();
        assert_eq!(action, 1);
    }
}

#[test]
fn test_act_fails_when_all_actions_excluded() {
    let mut agent = agent();
    let state = array![0.1, 0.2, 0.3, 0.4];
    assert!(agent.act(state.view(), &[0, 1, 2]).is_err());
}

#[test]
fn test_store_respects_capacity() {
    let mut agent = DqnAgentBuilder::new()
        .layer_sizes(&[4, 8, 3])
        .memory_capacity(5)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .unwrap();

    for i in 0..20 {
        agent.store(transition(i as f32, 0.0, false));
        assert!(agent.memory.len() <= 5);
    }
    assert_eq!(agent.memory.len(), 5);
}

#[test]
fn test_learn_on_empty_memory_fails() {
    let mut agent = agent();
    assert!(agent.learn(32).is_err());
}

#[test]
fn test_learn_decays_epsilon_to_floor() {
    let mut agent = agent();
    agent.epsilon = 0.05;
    agent.epsilon_min = 0.01;
    agent.epsilon_decay = 0.5;

    for i in 0..10 {
        agent.store(transition(i as f32, 1.0, false));
    }

    let mut previous = agent.epsilon;
    for _ in 0..20 {
        agent.learn(4).unwrap();
        assert!(agent.epsilon <= previous);
        assert!(agent.epsilon >= agent.epsilon_min);
        previous = agent.epsilon;
    }
    assert_eq!(agent.epsilon, agent.epsilon_min);
}

#[test]
fn test_learn_does_not_raise_epsilon_already_below_floor() {
    let mut agent = agent();
    agent.epsilon = 0.0;
    agent.store(transition(0.0, 1.0, false));

    agent.learn(1).unwrap();
    assert_eq!(agent.epsilon, 0.0);
}

#[test]
fn test_learn_returns_finite_loss() {
    let mut agent = agent();
    for i in 0..40 {
        agent.store(transition(i as f32, if i % 4 == 0 { 1.0 } else { 0.0 }, i % 10 == 9));
    }

    let loss = agent.learn(16).unwrap();
    assert!(loss.is_finite());
    assert!(loss >= 0.0);
}

#[test]
fn test_learn_skips_stationary_transitions() {
    let mut agent = agent();
    // Transitions whose state equals their next state carry no signal; a
    // memory of only those produces a zero-example learn call.
    for _ in 0..5 {
        agent.store(Transition {
            state: array![1.0, 2.0, 3.0, 4.0],
            action: 0,
            reward: 0.0,
            next_state: array![1.0, 2.0, 3.0, 4.0],
            done: false,
        });
    }

    let loss = agent.learn(4).unwrap();
    assert_eq!(loss, 0.0);
}

#[test]
fn test_target_network_syncs_on_schedule() {
    let mut agent = DqnAgentBuilder::new()
        .layer_sizes(&[4, 8, 3])
        .target_update_freq(1)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .unwrap();

    for i in 0..10 {
        agent.store(transition(i as f32, 1.0, false));
    }
    agent.learn(8).unwrap();

    let state = array![0.1, 0.2, 0.3, 0.4];
    let online = agent.q_network.forward(state.view());
    let target = agent.target_network.forward(state.view());
    assert_eq!(online, target);
}

#[test]
fn test_builder_validation() {
    // Missing optimizer
    assert!(DqnAgentBuilder::new().layer_sizes(&[4, 8, 2]).build().is_err());

    // Too few layers
    assert!(DqnAgentBuilder::new()
        .layer_sizes(&[4])
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .is_err());

    // Zero-capacity memory
    assert!(DqnAgentBuilder::new()
        .layer_sizes(&[4, 8, 2])
        .memory_capacity(0)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .is_err());

    // Floor above the starting rate
    assert!(DqnAgentBuilder::new()
        .layer_sizes(&[4, 8, 2])
        .epsilon(0.1)
        .epsilon_min(0.5)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .is_err());
}

#[test]
fn test_builder_applies_configuration() {
    let agent = DqnAgentBuilder::new()
        .layer_sizes(&[4, 8, 2])
        .epsilon(0.7)
        .epsilon_min(0.05)
        .epsilon_decay(0.9)
        .gamma(0.95)
        .learning_rate(0.01)
        .memory_capacity(128)
        .sampling(SamplingStrategy::reward_biased())
        .target_update_freq(7)
        .optimizer(OptimizerWrapper::SGD(SGD::new()))
        .build()
        .unwrap();

    assert_eq!(agent.epsilon, 0.7);
    assert_eq!(agent.epsilon_min, 0.05);
    assert_eq!(agent.epsilon_decay, 0.9);
    assert_eq!(agent.gamma, 0.95);
    assert_eq!(agent.learning_rate, 0.01);
    assert_eq!(agent.memory.capacity(), 128);
    assert_eq!(agent.target_update_freq, 7);
    assert_eq!(agent.action_count(), 2);
}

#[test]
fn test_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.bin");
    let path = path.to_str().unwrap();

    let mut agent = agent();
    agent.epsilon = 0.42;
    agent.gamma = 0.9;
    let state = array![0.1, 0.2, 0.3, 0.4];
    let before = agent.q_network.forward(state.view());

    agent.save(path).unwrap();
    let mut loaded = DqnAgent::load(path).unwrap();

    assert_eq!(loaded.epsilon, 0.42);
    assert_eq!(loaded.gamma, 0.9);
    assert!(loaded.memory.is_empty());
    let after = loaded.q_network.forward(state.view());
    assert_eq!(before, after);
}
