//! Kairos - ordered replay of timestamped RDF observation datasets
//!
//! Headless command-line replay runner: loads a dataset, builds the replay
//! sequence, and replays it to the configured sink either batch-wise to the
//! end or one observation at a time.
//!
//! Usage:
//!   cargo run --bin kairos -- --dataset data/observations.nt --drain

use clap::Parser;
use kairos::config::ReplayConfig;
use kairos::replay::driver::{ReplayDriver, StepOutcome};
use kairos::replay::session::ReplaySession;
use kairos::sink::LdpSink;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kairos")]
#[command(about = "Ordered replay of a timestamped RDF observation dataset", long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset file to load
    #[arg(short, long)]
    dataset: PathBuf,

    /// Replay the whole dataset batch-wise to the end
    #[arg(long, conflicts_with = "steps")]
    drain: bool,

    /// Replay exactly this many observations, one at a time
    #[arg(long)]
    steps: Option<usize>,

    /// Override the configured drain batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if args.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => ReplayConfig::from_file(path)?,
        None => ReplayConfig::default(),
    };
    let batch_size = args.batch_size.unwrap_or(config.batch_size);

    let mut session = ReplaySession::new(config, Arc::new(LdpSink::new()))?;
    let quads = session.load_dataset(&args.dataset)?;
    let length = session.build_sequence()?;
    info!(quads, observations = length, "dataset ready for replay");

    let mut driver = ReplayDriver::new(&mut session);
    if args.drain {
        let positions = driver.drain_to_end(batch_size).await?;
        info!(iterations = positions.len(), "drain complete");
    } else {
        let steps = args.steps.unwrap_or(1);
        for _ in 0..steps {
            match driver.advance_one().await? {
                StepOutcome::Advanced(position) => {
                    info!(position, length, "observation replayed");
                }
                StepOutcome::NoMoreObservations => {
                    info!("sequence exhausted");
                    break;
                }
            }
        }
    }

    Ok(())
}
