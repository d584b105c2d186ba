use log::{debug, info};

use crate::agent::DqnAgent;
use crate::env::Environment;
use crate::error::Result;
use crate::metrics::MetricsTracker;
use crate::replay_buffer::Transition;

/// Episode-loop configuration.
#[derive(Clone, Debug)]
pub struct TrainerConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Step limit per episode
    pub max_steps: usize,

    /// Minibatch size passed to `learn`
    pub batch_size: usize,

    /// Reward stored for the step that terminates an episode, replacing the
    /// environment's raw terminal reward
    pub terminal_reward: f32,

    /// Episodes between progress log lines
    pub log_every: usize,

    /// Checkpoint file written every `checkpoint_every` episodes, if set
    pub checkpoint_path: Option<String>,
    pub checkpoint_every: usize,

    /// An environment counts as solved when the mean episode length over the
    /// last `solved_window` episodes reaches `solved_threshold`
    pub solved_window: usize,
    pub solved_threshold: f32,
    pub stop_when_solved: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            episodes: 1000,
            max_steps: 500,
            batch_size: 32,
            terminal_reward: -10.0,
            log_every: 25,
            checkpoint_path: None,
            checkpoint_every: 10,
            solved_window: 100,
            solved_threshold: 195.0,
            stop_when_solved: true,
        }
    }
}

/// Drives episodes of an environment, collecting transitions into the
/// agent's replay memory and triggering one learning update per episode.
pub struct Trainer<E: Environment> {
    env: E,
    config: TrainerConfig,
}

impl<E: Environment> Trainer<E> {
    pub fn new(env: E, config: TrainerConfig) -> Self {
        Trainer { env, config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the training loop, recording progress into `tracker`.
    ///
    /// Each episode: roll out up to `max_steps` steps, storing every
    /// transition (terminating steps store `terminal_reward` instead of the
    /// environment's reward); then, once the memory holds more than
    /// `batch_size` transitions, perform one `learn` call.
    pub fn run(&mut self, agent: &mut DqnAgent, tracker: &mut MetricsTracker) -> Result<()> {
        info!(
            "training for up to {} episodes (batch size {}, epsilon {:.3})",
            self.config.episodes, self.config.batch_size, agent.epsilon
        );

        let mut announced_solved = false;

        for episode in 0..self.config.episodes {
            let mut state = self.env.reset();
            let mut total_reward = 0.0;
            let mut steps = 0usize;

            for _ in 0..self.config.max_steps {
                let action = agent.act(state.view(), &[])?;
                let (next_state, mut reward, done) = self.env.step(action);
                if done {
                    reward = self.config.terminal_reward;
                }

                agent.store(Transition {
                    state,
                    action,
                    reward,
                    next_state: next_state.clone(),
                    done,
                });

                state = next_state;
                total_reward += reward;
                steps += 1;

                if done {
                    break;
                }
            }

            if agent.memory.len() > self.config.batch_size {
                let loss = agent.learn(self.config.batch_size)?;
                tracker.record_loss(loss);
            }
            tracker.record_episode(total_reward, steps, agent.epsilon);

            if (episode + 1) % self.config.log_every == 0 {
                info!(
                    "episode {}/{}: steps={}, reward={:.1}, mean_len={:.1}, epsilon={:.3}",
                    episode + 1,
                    self.config.episodes,
                    steps,
                    total_reward,
                    tracker.recent_mean_length(self.config.log_every),
                    agent.epsilon
                );
            }

            if let Some(path) = &self.config.checkpoint_path {
                if self.config.checkpoint_every > 0
                    && (episode + 1) % self.config.checkpoint_every == 0
                {
                    agent.save(path)?;
                    debug!("checkpoint written to {}", path);
                }
            }

            if tracker.solved(self.config.solved_window, self.config.solved_threshold) {
                if !announced_solved {
                    announced_solved = true;
                    info!(
                        "solved at episode {}: mean length {:.1} over last {} episodes",
                        episode + 1,
                        tracker.recent_mean_length(self.config.solved_window),
                        self.config.solved_window
                    );
                }
                if self.config.stop_when_solved {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Greedy evaluation: run `episodes` rollouts with exploration disabled
    /// and return the mean episode length. The agent's exploration rate is
    /// restored afterwards.
    pub fn evaluate(&mut self, agent: &mut DqnAgent, episodes: usize) -> Result<f32> {
        let saved_epsilon = agent.epsilon;
        agent.epsilon = 0.0;
        let result = self.greedy_rollouts(agent, episodes);
        agent.epsilon = saved_epsilon;
        result
    }

    fn greedy_rollouts(&mut self, agent: &mut DqnAgent, episodes: usize) -> Result<f32> {
        if episodes == 0 {
            return Ok(0.0);
        }

        let mut total_steps = 0usize;
        for game in 0..episodes {
            let mut state = self.env.reset();
            let mut steps = 0usize;

            for _ in 0..self.config.max_steps {
                let action = agent.act(state.view(), &[])?;
                let (next_state, _reward, done) = self.env.step(action);
                state = next_state;
                steps += 1;
                if done {
                    break;
                }
            }

            debug!("evaluation episode {}: {} steps", game + 1, steps);
            total_steps += steps;
        }

        Ok(total_steps as f32 / episodes as f32)
    }
}
