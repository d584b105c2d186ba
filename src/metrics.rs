use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded training series collected during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean per-example loss of each learn call
    pub losses: VecDeque<f32>,

    /// Total reward per episode
    pub episode_rewards: VecDeque<f32>,

    /// Steps survived per episode
    pub episode_lengths: VecDeque<usize>,

    /// Exploration rate after each episode
    pub epsilons: VecDeque<f32>,
}

impl TrainingHistory {
    pub fn new(history_size: usize) -> Self {
        TrainingHistory {
            losses: VecDeque::with_capacity(history_size),
            episode_rewards: VecDeque::with_capacity(history_size),
            episode_lengths: VecDeque::with_capacity(history_size),
            epsilons: VecDeque::with_capacity(history_size),
        }
    }
}

/// Records training progress into a `TrainingHistory`, dropping the oldest
/// entries once a series reaches the configured history size.
pub struct MetricsTracker {
    history: TrainingHistory,
    history_size: usize,
    episode_count: usize,
    total_steps: usize,
}

impl MetricsTracker {
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            history: TrainingHistory::new(history_size),
            history_size,
            episode_count: 0,
            total_steps: 0,
        }
    }

    /// Record the loss of a learn call.
    pub fn record_loss(&mut self, loss: f32) {
        if self.history.losses.len() >= self.history_size {
            self.history.losses.pop_front();
        }
        self.history.losses.push_back(loss);
    }

    /// Record a finished episode.
    pub fn record_episode(&mut self, total_reward: f32, length: usize, epsilon: f32) {
        if self.history.episode_rewards.len() >= self.history_size {
            self.history.episode_rewards.pop_front();
            self.history.episode_lengths.pop_front();
            self.history.epsilons.pop_front();
        }
        self.history.episode_rewards.push_back(total_reward);
        self.history.episode_lengths.push_back(length);
        self.history.epsilons.push_back(epsilon);
        self.episode_count += 1;
        self.total_steps += length;
    }

    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Mean episode length over the most recent `window` episodes.
    pub fn recent_mean_length(&self, window: usize) -> f32 {
        mean_of_tail(
            self.history
                .episode_lengths
                .iter()
                .map(|&l| l as f32),
            self.history.episode_lengths.len(),
            window,
        )
    }

    /// Mean episode reward over the most recent `window` episodes.
    pub fn recent_mean_reward(&self, window: usize) -> f32 {
        mean_of_tail(
            self.history.episode_rewards.iter().copied(),
            self.history.episode_rewards.len(),
            window,
        )
    }

    /// Whether the recent mean episode length has reached `threshold` over a
    /// full `window` of episodes.
    pub fn solved(&self, window: usize, threshold: f32) -> bool {
        self.history.episode_lengths.len() >= window
            && self.recent_mean_length(window) >= threshold
    }
}

fn mean_of_tail(values: impl Iterator<Item = f32>, len: usize, window: usize) -> f32 {
    let skip = len.saturating_sub(window);
    let tail: Vec<f32> = values.skip(skip).collect();
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().sum::<f32>() / tail.len() as f32
}
