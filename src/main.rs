//! Car pooling service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │               CAR POOLING SERVICE            │
//!                  │                                              │
//!   HTTP request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ───────────────┼─▶│  http   │──▶│ handlers │──▶│ pooling   │  │
//!                  │  │ server  │   │          │   │ (engine   │  │
//!                  │  └─────────┘   └──────────┘   │  + lock)  │  │
//!   HTTP response  │       ▲             │         └───────────┘  │
//!   ◀──────────────┼───────┴─── response ┘                        │
//!                  │                                              │
//!                  │  config · observability · lifecycle · admin  │
//!                  └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use car_pooling::config::{load_config, validate_config, ConfigError, ServiceConfig};
use car_pooling::lifecycle::{self, signals, Shutdown};
use car_pooling::observability::logging;

#[derive(Parser)]
#[command(name = "car-pooling")]
#[command(about = "Seat passenger groups in shared cars", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability)?;

    tracing::info!("car-pooling v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_handler(shutdown.clone());

    let service = lifecycle::start(config, &shutdown).await?;
    service.handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
