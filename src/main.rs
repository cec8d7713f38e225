use clap::Parser;
use tracing::info;

mod config;
mod engine;
mod host;
mod observation;
mod observer;
mod turbine;

use config::{SimulationConfig, TurbineConfig};
use engine::Engine;
use observation::Snapshot;

#[derive(Parser, Debug)]
#[command(name = "windmill")]
#[command(about = "Wind turbine power simulation: altitude-driven generation, wind noise and wear")]
struct Args {
    /// Number of turbines to scatter (ignored when the config places them)
    #[arg(short = 'n', long, default_value = "4")]
    turbines: usize,

    /// Number of ticks to run
    #[arg(short, long, default_value = "600")]
    ticks: usize,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Turbine settings file, replacing the config's [turbine] section
    /// (legacy JSON config.txt or TOML)
    #[arg(long)]
    turbine_config: Option<String>,

    /// Snapshot to resume from
    #[arg(long)]
    resume: Option<String>,

    /// Output directory for events, snapshots and the summary
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = match args.verbose {
        0 => "windmill=info",
        1 => "windmill=debug",
        _ => "windmill=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Windmill v{}", env!("CARGO_PKG_VERSION"));

    // Load or create configuration
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default_with(args.turbines, args.ticks, args.seed),
    };
    if let Some(path) = &args.turbine_config {
        config.turbine = TurbineConfig::from_file(path)?;
        info!("Turbine settings loaded from {}", path);
    }
    if args.realtime {
        config.simulation.realtime = true;
    }

    info!(
        "Running '{}' for {} ticks ({} placements, {} scattered)",
        config.name,
        config.simulation.ticks,
        config.placements.len(),
        if config.placements.is_empty() { config.simulation.count } else { 0 }
    );

    let mut engine = Engine::new(config, &args.output)?;
    if let Some(path) = &args.resume {
        engine.restore(Snapshot::load(path)?);
    }
    engine.run().await?;

    for id in engine.turbine_ids() {
        if let Some(text) = engine.hover(id) {
            info!("{} | {}", text.primary, text.secondary);
        }
    }

    info!("Simulation complete. Output written to {}/", args.output);
    Ok(())
}
