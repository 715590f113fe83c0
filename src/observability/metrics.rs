//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpgate_connections_accepted_total` (counter)
//! - `httpgate_accept_errors_total` (counter)
//! - `httpgate_connections_active` (gauge): connections being served, via [`ActiveConnection`]
//! - `httpgate_responses_total` (counter): by status, `relayed` for proxied exchanges
//! - `httpgate_request_duration_seconds` (histogram)
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_accept() {
    counter!("httpgate_connections_accepted_total").increment(1);
}

pub fn record_accept_error() {
    counter!("httpgate_accept_errors_total").increment(1);
}

/// Counts one connection in `httpgate_connections_active` while alive.
/// The decrement runs on drop, so a panicking handler is still counted out.
#[must_use = "the connection is counted out as soon as this is dropped"]
pub struct ActiveConnection(());

impl ActiveConnection {
    pub fn open() -> Self {
        gauge!("httpgate_connections_active").increment(1.0);
        Self(())
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        gauge!("httpgate_connections_active").decrement(1.0);
    }
}

/// Record one finished exchange. `status` is the code sent, or `relayed`.
pub fn record_response(status: &str, started: Instant) {
    counter!("httpgate_responses_total", "status" => status.to_string()).increment(1);
    histogram!("httpgate_request_duration_seconds").record(started.elapsed().as_secs_f64());
}
