//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when enabled
//! - Bind the listener and build the router for the chosen deployment
//! - Wire OS signals to shutdown and run the accept loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and returned to `main`
//! - The configuration is expected to be validated already

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{Router, ServiceKind};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),
}

/// Run one deployment until SIGINT or SIGTERM.
pub async fn serve(kind: ServiceKind, config: ServerConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = Listener::bind(&config.listener).await?;
    let router = Router::from_config(kind, &config);
    let server = HttpServer::new(config, router);

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        match signals::wait_for_shutdown().await {
            Ok(signal) => tracing::info!(signal, "Shutdown requested"),
            Err(e) => tracing::error!(error = %e, "Signal handler failed, shutting down"),
        }
        shutdown.trigger();
    });

    server.run(listener, rx).await;
    Ok(())
}
