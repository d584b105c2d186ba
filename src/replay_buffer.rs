use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single step of interaction with the environment. Immutable once
/// recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// How minibatches are drawn from the buffer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Uniform random sampling without replacement.
    Uniform,
    /// Sampling with replacement, weighted so transitions with a non-zero
    /// reward are drawn more often than zero-reward filler steps.
    RewardBiased { base_weight: f32, reward_weight: f32 },
}

impl SamplingStrategy {
    /// Weighting that makes reward-carrying transitions five times as
    /// likely to be drawn as zero-reward ones.
    pub fn reward_biased() -> Self {
        SamplingStrategy::RewardBiased {
            base_weight: 5.0,
            reward_weight: 25.0,
        }
    }
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        SamplingStrategy::Uniform
    }
}

/// A fixed-capacity FIFO store of transitions. Pushing at capacity evicts
/// the oldest entry, so the buffer length never exceeds `capacity`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    strategy: SamplingStrategy,
}

impl ReplayBuffer {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new(capacity: usize) -> Self {
        ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            strategy: SamplingStrategy::Uniform,
        }
    }

    pub fn with_strategy(mut self, strategy: SamplingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw a minibatch according to the buffer's sampling strategy. When the
    /// buffer holds fewer than `batch_size` transitions the whole buffer is
    /// returned.
    pub fn sample(&self, batch_size: usize) -> Vec<&Transition> {
        let actual = batch_size.min(self.buffer.len());
        if actual == 0 {
            return Vec::new();
        }

        match self.strategy {
            SamplingStrategy::Uniform => self.sample_uniform(actual),
            SamplingStrategy::RewardBiased {
                base_weight,
                reward_weight,
            } => self.sample_reward_biased(actual, base_weight, reward_weight),
        }
    }

    fn sample_uniform(&self, batch_size: usize) -> Vec<&Transition> {
        let mut rng = thread_rng();
        let mut indices = (0..self.buffer.len()).collect::<Vec<usize>>();
        indices.shuffle(&mut rng);
        indices.truncate(batch_size);
        indices.into_iter().map(|i| &self.buffer[i]).collect()
    }

    fn sample_reward_biased(
        &self,
        batch_size: usize,
        base_weight: f32,
        reward_weight: f32,
    ) -> Vec<&Transition> {
        let weights: Vec<f32> = self
            .buffer
            .iter()
            .map(|t| if t.reward == 0.0 { base_weight } else { reward_weight })
            .collect();
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return self.sample_uniform(batch_size);
        }

        let mut rng = thread_rng();
        let mut samples = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let r: f32 = rng.gen::<f32>() * total;
            let mut cumsum = 0.0;
            let mut chosen = self.buffer.len() - 1;
            for (i, &w) in weights.iter().enumerate() {
                cumsum += w;
                if r <= cumsum {
                    chosen = i;
                    break;
                }
            }
            samples.push(&self.buffer[chosen]);
        }
        samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
