use crate::replay_buffer::{ReplayBuffer, SamplingStrategy, Transition};
use ndarray::array;

fn transition(id: f32, reward: f32) -> Transition {
    Transition {
        state: array![id],
        action: 0,
        reward,
        next_state: array![id + 1.0],
        done: false,
    }
}

#[test]
fn test_push_and_sample() {
    let mut buffer = ReplayBuffer::new(10);
    let t = transition(0.5, 1.0);
    buffer.push(t.clone());
    assert_eq!(buffer.len(), 1);
    let sample = buffer.sample(1);
    assert_eq!(sample[0], &t);
}

#[test]
fn test_capacity_evicts_oldest() {
    let mut buffer = ReplayBuffer::new(3);

    for i in 0..5 {
        buffer.push(transition(i as f32, 0.0));
    }

    // Only the last 3 survive
    assert_eq!(buffer.len(), 3);

    let states: Vec<f32> = buffer.iter().map(|t| t.state[0]).collect();
    assert_eq!(states, vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_never_exceeds_capacity() {
    let mut buffer = ReplayBuffer::new(7);
    for i in 0..100 {
        buffer.push(transition(i as f32, 0.0));
        assert!(buffer.len() <= 7);
    }
}

#[test]
fn test_is_empty() {
    let mut buffer = ReplayBuffer::new(10);
    assert!(buffer.is_empty());
    buffer.push(transition(0.0, 0.0));
    assert!(!buffer.is_empty());
}

#[test]
fn test_sample_sizes() {
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..5 {
        buffer.push(transition(i as f32, 0.0));
    }

    assert_eq!(buffer.sample(1).len(), 1);
    assert_eq!(buffer.sample(3).len(), 3);

    // Short buffer: asking for more returns the whole buffer
    assert_eq!(buffer.sample(10).len(), 5);
}

#[test]
fn test_sample_empty_buffer() {
    let buffer = ReplayBuffer::new(10);
    assert!(buffer.sample(4).is_empty());
}

#[test]
fn test_uniform_sample_has_no_duplicates() {
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..10 {
        buffer.push(transition(i as f32, 0.0));
    }

    let sample = buffer.sample(10);
    let mut ids: Vec<f32> = sample.iter().map(|t| t.state[0]).collect();
    ids.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_reward_biased_sampling_favors_rewards() {
    let mut buffer = ReplayBuffer::new(10).with_strategy(SamplingStrategy::reward_biased());

    buffer.push(transition(0.0, 1.0));
    for i in 1..10 {
        buffer.push(transition(i as f32, 0.0));
    }

    // Weight 25 vs 5 makes the single reward-carrying transition ~36% of
    // draws; uniform would give 10%.
    let mut rewarded = 0;
    for _ in 0..1000 {
        let sample = buffer.sample(1);
        if sample[0].reward != 0.0 {
            rewarded += 1;
        }
    }
    assert!(rewarded > 200, "rewarded draws: {}", rewarded);
}

#[test]
fn test_reward_biased_short_buffer() {
    let mut buffer = ReplayBuffer::new(10).with_strategy(SamplingStrategy::reward_biased());
    buffer.push(transition(0.0, 1.0));
    buffer.push(transition(1.0, 0.0));

    assert_eq!(buffer.sample(32).len(), 2);
}
