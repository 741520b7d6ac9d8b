//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener and spawn the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::pooling::SharedEngine;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A server running in the background.
pub struct RunningService {
    /// Address the listener actually bound (useful with port 0).
    pub local_addr: SocketAddr,
    /// Engine shared with the server's handlers.
    pub engine: SharedEngine,
    /// Completes once the server has drained after shutdown.
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Bring the service up according to `config`.
pub async fn start(config: ServiceConfig, shutdown: &Shutdown) -> Result<RunningService, StartupError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address {
                field: "observability.metrics_address",
                value: config.observability.metrics_address.clone(),
            })?;
        metrics::init_metrics(addr);
    }

    let bind_address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            addr: bind_address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(|source| StartupError::Bind {
        addr: bind_address,
        source,
    })?;

    let engine = SharedEngine::new();
    let server = HttpServer::with_engine(config, engine.clone());
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    tracing::info!(address = %local_addr, "Car pooling service started");

    Ok(RunningService {
        local_addr,
        engine,
        handle,
    })
}
