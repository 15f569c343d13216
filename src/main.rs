//! Kuiper Escape headless runner
//!
//! Plays one episode with a built-in policy and prints the summary as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use kuiper_escape::{
    Difficulty, EvadePolicy, GameConfig, IdlePolicy, Lidar, LidarConfig, Policy, RandomPolicy,
    World, default_max_ticks, run_episode,
};

#[derive(Parser, Debug)]
#[command(name = "kuiper-escape")]
#[command(about = "Dodge the asteroid belt for as long as possible")]
struct Cli {
    /// World seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Difficulty preset, ignored when --config is given
    #[arg(long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// JSON game config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tick cap (defaults to fifteen minutes of play)
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long, value_enum, default_value_t = CliPolicy::Evade)]
    policy: CliPolicy,
    /// Lidar beam count
    #[arg(long)]
    beams: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPolicy {
    Idle,
    Random,
    Evade,
}

fn make_policy(kind: CliPolicy, seed: u64) -> Box<dyn Policy> {
    match kind {
        CliPolicy::Idle => Box::new(IdlePolicy),
        // Offset so the policy stream differs from the world's
        CliPolicy::Random => Box::new(RandomPolicy::new(Pcg32::seed_from_u64(seed ^ 0x9e37_79b9))),
        CliPolicy::Evade => Box::new(EvadePolicy::default()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::from_difficulty(cli.difficulty),
    };

    let mut lidar_config = LidarConfig::default();
    if let Some(beams) = cli.beams {
        lidar_config.beam_count = beams;
    }
    let lidar = Lidar::new(lidar_config).context("invalid lidar settings")?;

    let max_ticks = cli.max_ticks.unwrap_or_else(|| default_max_ticks(&config));
    log::info!(
        "Starting episode: seed {}, policy {:?}, max ticks {}",
        cli.seed,
        cli.policy,
        max_ticks
    );

    let mut world = World::new(config, cli.seed).context("invalid game config")?;
    let mut policy = make_policy(cli.policy, cli.seed);
    let summary = run_episode(&mut world, &lidar, policy.as_mut(), max_ticks);

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
