//! Weir - pluggable multi-pipeline data-ingestion runtime
//!
//! # Usage
//!
//! ```bash
//! # Run with the default pipelines file
//! weir
//! weir --config configs/pipelines.yaml
//!
//! # With a control server configuration
//! weir --config configs/pipelines.yaml --server-config configs/server.yaml
//! ```
//!
//! The process exits 0 on clean shutdown and non-zero when startup validation
//! fails or a pipeline cannot start.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weir_config::{PipelinesConfig, ServerConfig};
use weir_core::{PipelineManager, PipelineParser};
use weir_server::AppState;

/// Weir - pluggable multi-pipeline data-ingestion runtime
#[derive(Parser, Debug)]
#[command(name = "weir")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the pipelines configuration file
    #[arg(short, long, default_value = "pipelines.yaml")]
    config: PathBuf,

    /// Path to the control server configuration file
    ///
    /// Defaults apply when omitted: plain HTTP on port 4900 with the
    /// Prometheus registry enabled.
    #[arg(long)]
    server_config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let pipelines_config = PipelinesConfig::from_file(&cli.config)
        .with_context(|| format!("loading pipelines from {}", cli.config.display()))?;
    let server_config = match &cli.server_config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading server config from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    let registry = weir_plugins::default_registry();
    let built = PipelineParser::new(&registry)
        .parse(&pipelines_config)
        .context("building pipelines")?;
    let manager = Arc::new(PipelineManager::new(built));

    manager.start().await.context("starting pipelines")?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        Arc::clone(&manager),
        shutdown.clone(),
        server_config.prometheus_enabled(),
    );
    let server = tokio::spawn(weir_server::serve(server_config, state));

    tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::info!("shutdown requested over the control API");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("listening for interrupt")?;
            tracing::info!("interrupt received, shutting down");
            shutdown.cancel();
        }
    }

    manager.shutdown().await;
    server.await.context("control server task")??;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
