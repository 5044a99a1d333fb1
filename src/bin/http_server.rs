//! HTTP Server Binary for the Kairos replay API
//!
//! Starts the replay engine behind its REST transport: dataset loading,
//! sequence building, single-step / drain / autoplay replay control.
//!
//! Usage:
//!   cargo run --bin http_server -- --host 0.0.0.0 --config config/replay.json

use clap::Parser;
use kairos::config::ReplayConfig;
use kairos::http::{start_server, AppState};
use kairos::replay::session::ReplaySession;
use kairos::sink::LdpSink;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "Kairos HTTP Server")]
#[command(about = "HTTP API server for the Kairos ordered replay engine", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Overrides the port from the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

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
    let port = args.port.unwrap_or(config.port);

    info!(
        dataset_folder = %config.dataset_folder,
        destination = %config.destination_url,
        "initializing replay session"
    );
    let session = ReplaySession::new(config.clone(), Arc::new(LdpSink::new()))?;
    let state = Arc::new(AppState::new(session, config));

    let addr = format!("{}:{}", args.host, port);

    // Set up graceful shutdown
    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        info!("shutdown signal received, stopping server");
    };

    // Run server with graceful shutdown
    tokio::select! {
        result = start_server(&addr, state) => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            info!("server shut down gracefully");
        }
    }

    Ok(())
}
