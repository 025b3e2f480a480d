//! Swarm allocation simulation binary

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use taskswarm::core::config::SwarmConfig;
use taskswarm::core::error::Result;
use taskswarm::game::simulate;

#[derive(Parser, Debug)]
#[command(name = "swarm_sim", about = "Population-game task allocation simulator")]
struct Args {
    /// TOML experiment file; defaults to the built-in foraging setup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the agent count
    #[arg(long)]
    agents: Option<u32>,

    /// Override the simulation horizon in seconds
    #[arg(long)]
    horizon: Option<f64>,

    /// Write the full trace as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskswarm=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SwarmConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => SwarmConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(agents) = args.agents {
        config.agents = agents;
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }

    println!("Starting swarm allocation simulation");
    println!("====================================");
    println!(
        "{} agents over {} tasks, lambda={} Hz, rho={}, nu={}",
        config.agents,
        config.task_count(),
        config.lambda,
        config.rho,
        config.nu,
    );
    println!("Simulating {} seconds (seed {})...", config.horizon, config.seed);
    println!();

    let start = Instant::now();
    let output = simulate(config)?;
    let elapsed = start.elapsed();

    println!("{}", output.summary());
    println!("Actual time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    if let Some(path) = &args.output {
        std::fs::write(path, output.to_json())?;
        println!("\nFull trace written to {}", path.display());
    }

    Ok(())
}
