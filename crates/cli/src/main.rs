//! Scenario runner entry point.
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sim_runtime::{ConfigLoader, ScenarioLoader, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "bt-sim")]
#[command(about = "Run a behavior-tree scenario in virtual time", long_about = None)]
struct Args {
    /// Scenario file (RON)
    scenario: PathBuf,

    /// Session config file (TOML); environment variables apply otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shared random seed, overriding config and scenario
    #[arg(short, long)]
    seed: Option<u64>,

    /// Virtual milliseconds to run, overriding the scenario
    #[arg(short, long)]
    duration: Option<u64>,

    /// Print the transcript as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_dir = std::env::var_os("BT_SIM_LOG_DIR").map(PathBuf::from);
    let _guard = logging::setup_logging(log_dir.as_deref())?;

    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<()> {
    let scenario = ScenarioLoader::load(&args.scenario)
        .with_context(|| format!("loading scenario {}", args.scenario.display()))?;

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => SessionConfig::from_env(),
    };
    if let Some(seed) = args.seed.or(scenario.seed) {
        config.seed = seed;
    }
    let duration = args.duration.unwrap_or(scenario.duration);

    let mut session = Session::with_default_registry(config)?;
    let ids = scenario.populate(&mut session)?;
    tracing::info!("Running {} actors for {}ms", ids.len(), duration);

    session.run_until(duration)?;

    for entry in session.transcript().entries() {
        if args.json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!(
                "{:>8}ms {} {:<18} {:<7} {}{}",
                entry.at,
                entry.actor,
                entry.name,
                entry.outcome.as_str(),
                entry.data,
                if entry.root { " (root)" } else { "" },
            );
        }
    }

    tracing::info!(
        "Finished at t={} with {} events, {} completions, {} actors alive",
        session.now(),
        session.events_fired(),
        session.transcript().len(),
        session.actor_count()
    );
    println!("transcript {}", session.transcript().digest_hex());
    println!("state      {}", session.state_digest_hex());
    Ok(())
}

