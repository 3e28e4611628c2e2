//! Timesearch API Server
//!
//! Run with: cargo run -- path/to/queries.tsv
//!
//! # Configuration
//!
//! Environment variables:
//! - `TIMESEARCH_DATASET`: Path to the TSV dataset
//! - `TIMESEARCH_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TIMESEARCH_API_PORT`: Port to listen on (default: 8080)
//! - `TIMESEARCH_LOG_LEVEL`: Log level (default: info)
//! - `RUST_LOG`: Overrides the tracing filter entirely

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use timesearch::api::{serve, ApiConfig, AppState};
use timesearch::config::Config;
use timesearch::dataset::load_tsv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "timesearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Distinct-count and most-popular analytics over a timestamped query log")]
struct Cli {
    /// Path to the TSV dataset (timestamp<TAB>query). Overrides config.
    dataset: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesearch=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Timesearch v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    let dataset_path = cli
        .dataset
        .or(config.dataset.path.clone())
        .context("no dataset given; pass a path or set TIMESEARCH_DATASET")?;

    let api_config = ApiConfig {
        host: cli.host.unwrap_or(config.api.host),
        port: cli.port.unwrap_or(config.api.port),
        ..Default::default()
    };

    // load phase: the engine is mutable here and frozen below
    tracing::info!("Loading dataset from {:?}", dataset_path);
    let load_started = std::time::Instant::now();
    let engine = load_tsv(&dataset_path)
        .with_context(|| format!("failed to load dataset {:?}", dataset_path))?;
    tracing::info!(
        records = engine.len(),
        elapsed_ms = load_started.elapsed().as_millis() as u64,
        "dataset loaded, index frozen"
    );

    let state = AppState::new(Arc::new(engine), api_config.clone());

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Timesearch stopped");
    Ok(())
}
