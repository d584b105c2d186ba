use ndarray::{Array1, ArrayView1};
use rand::{rngs::ThreadRng, Rng};
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::network::NeuralNetwork;
use crate::optimizer::OptimizerWrapper;
use crate::replay_buffer::{ReplayBuffer, SamplingStrategy, Transition};

/// Deep Q-Network agent with experience replay.
///
/// The agent owns the Q-network, a target network used for bootstrapped
/// target estimation, and the replay memory transitions are stored into.
/// Exploration follows an epsilon-greedy policy whose rate decays
/// geometrically toward a floor each time the agent learns.
///
/// # Example
///
/// ```rust
/// use cartpole_dqn::agent::DqnAgent;
/// use cartpole_dqn::optimizer::{OptimizerWrapper, SGD};
/// use cartpole_dqn::replay_buffer::Transition;
/// use ndarray::array;
///
/// let optimizer = OptimizerWrapper::SGD(SGD::new());
/// let mut agent = DqnAgent::new(&[4, 24, 24, 2], optimizer);
///
/// let state = array![0.1, -0.2, 0.3, -0.1];
/// let action = agent.act(state.view(), &[]).unwrap();
///
/// agent.store(Transition {
///     state: state.clone(),
///     action,
///     reward: 1.0,
///     next_state: array![0.15, -0.25, 0.35, -0.05],
///     done: false,
/// });
///
/// if agent.memory.len() >= 32 {
///     let loss = agent.learn(32).unwrap();
/// }
/// ```
#[derive(Serialize, Deserialize)]
pub struct DqnAgent {
    /// Online network used for action selection and fitting
    pub q_network: NeuralNetwork,

    /// Target network used to evaluate bootstrapped targets
    pub target_network: NeuralNetwork,

    /// Replay memory; not persisted by `save`, so a loaded agent starts with
    /// an empty default-capacity buffer
    #[serde(skip)]
    pub memory: ReplayBuffer,

    /// Exploration rate
    pub epsilon: f32,

    /// Floor the exploration rate decays toward
    pub epsilon_min: f32,

    /// Geometric decay factor applied to epsilon after each learn call
    pub epsilon_decay: f32,

    /// Discount factor for bootstrapped targets
    pub gamma: f32,

    /// Step size for the supervised fit
    pub learning_rate: f32,

    /// Learn calls between target network syncs
    pub target_update_freq: usize,

    /// Number of learn calls performed
    learn_steps: usize,

    #[serde(skip)]
    rng: ThreadRng,
}

impl DqnAgent {
    /// Create a new agent with the usual CartPole defaults: epsilon decaying from
    /// 1.0 to 0.01 by a factor of 0.995 per learn call, gamma 0.99, learning
    /// rate 1e-3, and a 10,000-transition uniform replay memory.
    pub fn new(layer_sizes: &[usize], optimizer: OptimizerWrapper) -> Self {
        if layer_sizes.len() < 2 {
            panic!("Network must have at least input and output layers");
        }

        // ReLU hidden layers, Linear output for unbounded Q-values.
        let mut activations = vec![Activation::Relu; layer_sizes.len() - 2];
        activations.push(Activation::Linear);

        let q_network = NeuralNetwork::new(layer_sizes, &activations, optimizer);
        let target_network = q_network.clone();

        DqnAgent {
            q_network,
            target_network,
            memory: ReplayBuffer::default(),
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            gamma: 0.99,
            learning_rate: 1e-3,
            target_update_freq: 10,
            learn_steps: 0,
            rng: rand::thread_rng(),
        }
    }

    /// Number of actions the agent chooses between.
    pub fn action_count(&self) -> usize {
        self.q_network.output_size()
    }

    /// Q-value estimates for a state.
    pub fn q_values(&mut self, state: ArrayView1<f32>) -> Array1<f32> {
        self.q_network.forward(state)
    }

    /// Select an action with an epsilon-greedy policy, never returning an
    /// action listed in `excluded_actions`.
    ///
    /// With probability `epsilon` a uniformly random allowed action is taken;
    /// otherwise the allowed action with the highest predicted Q-value.
    pub fn act(&mut self, state: ArrayView1<f32>, excluded_actions: &[usize]) -> Result<usize> {
        let num_actions = self.action_count();
        if num_actions == 0 {
            return Err(DqnError::TrainingError("No layers in network".to_string()));
        }

        let allowed: Vec<usize> = (0..num_actions)
            .filter(|action| !excluded_actions.contains(action))
            .collect();
        if allowed.is_empty() {
            return Err(DqnError::invalid_parameter(
                "excluded_actions",
                "every action is excluded",
            ));
        }

        if self.rng.gen::<f32>() < self.epsilon {
            // Exploration: random allowed action
            Ok(allowed[self.rng.gen_range(0..allowed.len())])
        } else {
            // Exploitation: best allowed action from the Q-network
            let q_values = self.q_network.forward(state);
            let mut best = allowed[0];
            for &action in &allowed[1..] {
                if q_values[action] > q_values[best] {
                    best = action;
                }
            }
            Ok(best)
        }
    }

    /// Record a transition in the replay memory, evicting the oldest entry
    /// once the memory is at capacity.
    pub fn store(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Sample a minibatch from the replay memory and perform one supervised
    /// fit step per sampled transition against the bootstrapped target
    /// `reward + gamma * max_a Q_target(next_state, a)` (just `reward` for
    /// terminal transitions). Transitions whose state equals their next state
    /// are skipped; they carry no learning signal.
    ///
    /// Afterwards the exploration rate decays toward its floor and the target
    /// network is synced every `target_update_freq` calls. Returns the mean
    /// per-example loss.
    pub fn learn(&mut self, batch_size: usize) -> Result<f32> {
        if self.memory.is_empty() {
            return Err(DqnError::EmptyBuffer(
                "No transitions to learn from".to_string(),
            ));
        }

        let minibatch = self.memory.sample(batch_size);
        let mut total_loss = 0.0;
        let mut examples = 0usize;

        for transition in minibatch {
            if transition.state == transition.next_state {
                continue;
            }
            if transition.action >= self.q_network.output_size() {
                return Err(DqnError::InvalidAction {
                    action: transition.action,
                    max_actions: self.q_network.output_size(),
                });
            }

            let target = if transition.done {
                transition.reward
            } else {
                let next_q = self.target_network.forward(transition.next_state.view());
                let max_next = next_q.iter().fold(f32::NEG_INFINITY, |max, &v| max.max(v));
                transition.reward + self.gamma * max_next
            };

            let mut target_q = self.q_network.forward(transition.state.view());
            target_q[transition.action] = target;

            total_loss +=
                self.q_network
                    .fit(transition.state.view(), target_q.view(), self.learning_rate);
            examples += 1;
        }

        if self.epsilon > self.epsilon_min {
            self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
        }

        self.learn_steps += 1;
        if self.target_update_freq > 0 && self.learn_steps % self.target_update_freq == 0 {
            self.update_target_network();
        }

        Ok(if examples > 0 {
            total_loss / examples as f32
        } else {
            0.0
        })
    }

    /// Copy the online network's weights into the target network.
    pub fn update_target_network(&mut self) {
        self.target_network = self.q_network.clone();
    }

    /// Number of learn calls performed so far.
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    /// Save the agent to disk. Persists the networks and scalar
    /// configuration; the replay memory is not written.
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load an agent from disk.
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut agent: Self = bincode::deserialize(&data)?;
        agent.rng = rand::thread_rng();
        Ok(agent)
    }
}

/// Builder pattern for `DqnAgent`
pub struct DqnAgentBuilder {
    layer_sizes: Vec<usize>,
    activations: Option<Vec<Activation>>,
    epsilon: f32,
    epsilon_min: f32,
    epsilon_decay: f32,
    gamma: f32,
    learning_rate: f32,
    memory_capacity: usize,
    sampling: SamplingStrategy,
    target_update_freq: usize,
    optimizer: Option<OptimizerWrapper>,
}

impl DqnAgentBuilder {
    pub fn new() -> Self {
        DqnAgentBuilder {
            layer_sizes: vec![],
            activations: None,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            gamma: 0.99,
            learning_rate: 1e-3,
            memory_capacity: ReplayBuffer::DEFAULT_CAPACITY,
            sampling: SamplingStrategy::Uniform,
            target_update_freq: 10,
            optimizer: None,
        }
    }

    pub fn layer_sizes(mut self, sizes: &[usize]) -> Self {
        self.layer_sizes = sizes.to_vec();
        self
    }

    pub fn activations(mut self, activations: &[Activation]) -> Self {
        self.activations = Some(activations.to_vec());
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn epsilon_min(mut self, epsilon_min: f32) -> Self {
        self.epsilon_min = epsilon_min;
        self
    }

    pub fn epsilon_decay(mut self, epsilon_decay: f32) -> Self {
        self.epsilon_decay = epsilon_decay;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn sampling(mut self, strategy: SamplingStrategy) -> Self {
        self.sampling = strategy;
        self
    }

    pub fn target_update_freq(mut self, freq: usize) -> Self {
        self.target_update_freq = freq;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerWrapper) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn build(self) -> Result<DqnAgent> {
        if self.layer_sizes.len() < 2 {
            return Err(DqnError::InvalidParameter {
                name: "layer_sizes".to_string(),
                reason: "Must have at least 2 layers".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(DqnError::invalid_parameter(
                "epsilon",
                "must be within [0, 1]",
            ));
        }
        if self.epsilon_min > self.epsilon {
            return Err(DqnError::invalid_parameter(
                "epsilon_min",
                "must not exceed the starting epsilon",
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon_decay) {
            return Err(DqnError::invalid_parameter(
                "epsilon_decay",
                "must be within (0, 1]",
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(DqnError::invalid_parameter(
                "learning_rate",
                "must be positive",
            ));
        }
        if self.memory_capacity == 0 {
            return Err(DqnError::invalid_parameter(
                "memory_capacity",
                "must be greater than 0",
            ));
        }

        let optimizer = self.optimizer.ok_or_else(|| DqnError::InvalidParameter {
            name: "optimizer".to_string(),
            reason: "Optimizer must be specified".to_string(),
        })?;

        let mut agent = if let Some(activations) = self.activations {
            if activations.len() != self.layer_sizes.len() - 1 {
                return Err(DqnError::InvalidParameter {
                    name: "activations".to_string(),
                    reason: "Number of activations must match number of layers - 1".to_string(),
                });
            }

            let q_network = NeuralNetwork::new(&self.layer_sizes, &activations, optimizer);
            let target_network = q_network.clone();
            DqnAgent {
                q_network,
                target_network,
                memory: ReplayBuffer::default(),
                epsilon: 1.0,
                epsilon_min: 0.01,
                epsilon_decay: 0.995,
                gamma: 0.99,
                learning_rate: 1e-3,
                target_update_freq: 10,
                learn_steps: 0,
                rng: rand::thread_rng(),
            }
        } else {
            DqnAgent::new(&self.layer_sizes, optimizer)
        };

        agent.memory = ReplayBuffer::new(self.memory_capacity).with_strategy(self.sampling);
        agent.epsilon = self.epsilon;
        agent.epsilon_min = self.epsilon_min;
        agent.epsilon_decay = self.epsilon_decay;
        agent.gamma = self.gamma;
        agent.learning_rate = self.learning_rate;
        agent.target_update_freq = self.target_update_freq;

        Ok(agent)
    }
}

impl Default for DqnAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
