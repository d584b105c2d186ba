//! Training binary: builds the agent, drives the episode loop on CartPole,
//! and writes the model file plus training-progress artifacts.

use clap::Parser;
use log::info;

use cartpole_dqn::activations::Activation;
use cartpole_dqn::agent::{DqnAgent, DqnAgentBuilder};
use cartpole_dqn::env::{CartPole, Environment};
use cartpole_dqn::error::Result;
use cartpole_dqn::layers::DenseLayer;
use cartpole_dqn::metrics::MetricsTracker;
use cartpole_dqn::optimizer::{Adam, OptimizerWrapper};
use cartpole_dqn::replay_buffer::SamplingStrategy;
use cartpole_dqn::trainer::{Trainer, TrainerConfig};
use cartpole_dqn::visualization;

#[derive(Parser, Debug)]
#[command(name = "cartpole-dqn", about = "Train a DQN agent on CartPole")]
struct Args {
    /// Number of training episodes
    #[arg(long, default_value_t = 1000)]
    episodes: usize,

    /// Step limit per episode
    #[arg(long, default_value_t = 500)]
    max_steps: usize,

    /// Minibatch size for learning updates
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Replay memory capacity
    #[arg(long, default_value_t = 10_000)]
    memory_capacity: usize,

    /// Reward stored when an episode terminates
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    terminal_reward: f32,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    gamma: f32,

    /// Learning rate
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f32,

    /// Geometric epsilon decay per learn call
    #[arg(long, default_value_t = 0.995)]
    epsilon_decay: f32,

    /// Exploration floor
    #[arg(long, default_value_t = 0.01)]
    epsilon_min: f32,

    /// Learn calls between target network syncs
    #[arg(long, default_value_t = 10)]
    target_update: usize,

    /// Bias minibatch sampling toward reward-carrying transitions
    #[arg(long)]
    reward_biased_sampling: bool,

    /// Model file to write (and to load when it exists)
    #[arg(long, default_value = "cartpole-dqn.bin")]
    model: String,

    /// Loss plot image to write after training
    #[arg(long, default_value = "loss.png")]
    loss_plot: String,

    /// Episode-length plot image to write after training
    #[arg(long, default_value = "episode_lengths.png")]
    length_plot: String,

    /// CSV history export to write after training
    #[arg(long)]
    history_csv: Option<String>,

    /// JSON history export to write after training
    #[arg(long)]
    history_json: Option<String>,

    /// Evaluate an existing model instead of training
    #[arg(long)]
    eval: bool,

    /// Evaluation episodes
    #[arg(long, default_value_t = 10)]
    eval_episodes: usize,
}

fn build_agent(args: &Args, env: &CartPole) -> Result<DqnAgent> {
    let layer_sizes = [env.observation_size(), 24, 24, env.action_count()];

    // Adam sizes its moment buffers off the layer shapes.
    let layers = vec![
        DenseLayer::new(layer_sizes[0], layer_sizes[1], Activation::Relu),
        DenseLayer::new(layer_sizes[1], layer_sizes[2], Activation::Relu),
        DenseLayer::new(layer_sizes[2], layer_sizes[3], Activation::Linear),
    ];
    let optimizer = OptimizerWrapper::Adam(Adam::default_for(&layers));

    let sampling = if args.reward_biased_sampling {
        SamplingStrategy::reward_biased()
    } else {
        SamplingStrategy::Uniform
    };

    DqnAgentBuilder::new()
        .layer_sizes(&layer_sizes)
        .gamma(args.gamma)
        .learning_rate(args.learning_rate)
        .epsilon_decay(args.epsilon_decay)
        .epsilon_min(args.epsilon_min)
        .memory_capacity(args.memory_capacity)
        .sampling(sampling)
        .target_update_freq(args.target_update)
        .optimizer(optimizer)
        .build()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let env = CartPole::new();
    let config = TrainerConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        batch_size: args.batch_size,
        terminal_reward: args.terminal_reward,
        checkpoint_path: Some(args.model.clone()),
        ..TrainerConfig::default()
    };

    let mut agent = if std::path::Path::new(&args.model).exists() {
        info!("loading saved agent from {}", args.model);
        let mut agent = DqnAgent::load(&args.model)?;
        agent.memory = cartpole_dqn::replay_buffer::ReplayBuffer::new(args.memory_capacity);
        agent
    } else {
        build_agent(&args, &env)?
    };

    let mut trainer = Trainer::new(env, config);

    if args.eval {
        let mean_length = trainer.evaluate(&mut agent, args.eval_episodes)?;
        info!(
            "evaluation over {} episodes: mean length {:.1} steps",
            args.eval_episodes, mean_length
        );
        println!("mean episode length: {:.1}", mean_length);
        return Ok(());
    }

    let mut tracker = MetricsTracker::new(args.episodes.max(1));
    trainer.run(&mut agent, &mut tracker)?;

    agent.save(&args.model)?;
    info!("model written to {}", args.model);

    let history = tracker.history();
    let losses: Vec<f32> = history.losses.iter().copied().collect();
    if !losses.is_empty() {
        visualization::save_line_chart(&losses, &args.loss_plot, 640, 480)?;
        info!("loss plot written to {}", args.loss_plot);
    }
    let lengths: Vec<f32> = history.episode_lengths.iter().map(|&l| l as f32).collect();
    if !lengths.is_empty() {
        visualization::save_line_chart(&lengths, &args.length_plot, 640, 480)?;
        info!("episode-length plot written to {}", args.length_plot);
    }
    if let Some(path) = &args.history_csv {
        visualization::export_history_csv(history, path)?;
        info!("history exported to {}", path);
    }
    if let Some(path) = &args.history_json {
        visualization::export_history_json(history, path)?;
        info!("history exported to {}", path);
    }

    println!(
        "trained {} episodes; mean length over last 100: {:.1}",
        tracker.episode_count(),
        tracker.recent_mean_length(100)
    );
    println!("{}", visualization::plot_series(&lengths, "Episode lengths", 70, 15));

    Ok(())
}
