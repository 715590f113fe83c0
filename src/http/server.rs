//! Accept loop and per-connection lifecycle.
//!
//! # Responsibilities
//! - Accept connections, logging and skipping accept failures
//! - Take an admission slot before spawning each connection task
//! - Parse one request, dispatch it, write one response, close
//! - Release the slot only after the connection is closed
//!
//! # Design Decisions
//! - The accept loop never waits on handlers, only on accept and admission
//! - Every per-connection error becomes a response inside the task
//! - Slots are held by the task, so a panicking handler still frees its slot

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::{ParsedRequest, RequestError, Response};
use crate::net::{AdmissionController, Connection, Listener};
use crate::observability::metrics;
use crate::routing::{Route, Router};

/// Pause after a failed accept so a persistent failure (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// One deployment: a router, its configuration and the admission pool.
pub struct HttpServer {
    config: Arc<ServerConfig>,
    router: Arc<Router>,
    admission: AdmissionController,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let admission = AdmissionController::new(config.listener.max_connections);
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
            admission,
        }
    }

    /// Handle to the admission pool, for inspection.
    pub fn admission(&self) -> AdmissionController {
        self.admission.clone()
    }

    /// Serve connections from `listener` until `shutdown` fires.
    ///
    /// Connections already admitted keep running after the loop exits.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            address = %listener.local_addr(),
            service = %self.router.kind(),
            max_connections = self.admission.capacity(),
            "Server listening"
        );

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!(error = %e, "Accept failed");
                        metrics::record_accept_error();
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
                _ = shutdown.recv() => break,
            };
            metrics::record_accept();

            let slot = tokio::select! {
                slot = self.admission.acquire() => slot,
                _ = shutdown.recv() => break,
            };

            let config = Arc::clone(&self.config);
            let router = Arc::clone(&self.router);
            let conn = Connection::new(stream, peer);
            let span = tracing::info_span!("connection", id = %conn.id(), peer = %peer);

            tokio::spawn(
                async move {
                    let active = metrics::ActiveConnection::open();
                    serve_connection(conn, &router, &config).await;
                    drop(active);
                    slot.release();
                }
                .instrument(span),
            );
        }

        tracing::info!("Server stopped accepting connections");
    }
}

/// Run one connection to completion: parse, dispatch, respond, close.
pub async fn serve_connection<S>(mut conn: Connection<S>, router: &Router, config: &ServerConfig)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let started = Instant::now();

    let request = match read_request(&mut conn, config).await {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting unreadable request");
            finish(conn, e.into_response(), started).await;
            return;
        }
    };

    log_request(&request, conn.peer());

    let outcome = match router.route(request.method()) {
        Route::FileGet(files) => files.get(&request).await,
        Route::FileUpload(files) => {
            let body = conn.body(&request);
            files.upload(&request, body).await
        }
        Route::Relay(relay) => match relay.relay(&request, &mut conn).await {
            Ok(bytes) => {
                tracing::debug!(bytes, "Relay finished");
                conn.close().await;
                metrics::record_response("relayed", started);
                return;
            }
            Err(e) => Err(e),
        },
        Route::NotImplemented => Err(RequestError::UnsupportedMethod(request.method().to_string())),
    };

    let response = outcome.unwrap_or_else(|e| {
        if e.status().is_server_error() {
            tracing::error!(error = %e, "Request failed");
        } else {
            tracing::debug!(error = %e, status = e.status().as_u16(), "Request rejected");
        }
        e.into_response()
    });
    finish(conn, response, started).await;
}

async fn read_request<S>(conn: &mut Connection<S>, config: &ServerConfig) -> Result<ParsedRequest, RequestError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match config.timeouts.read() {
        Some(limit) => match tokio::time::timeout(limit, conn.read_request(&config.limits)).await {
            Ok(parsed) => Ok(parsed?),
            Err(_) => Err(RequestError::Timeout),
        },
        None => Ok(conn.read_request(&config.limits).await?),
    }
}

fn log_request(request: &ParsedRequest, peer: SocketAddr) {
    if request.url().is_some() {
        tracing::info!(method = %request.method(), url = %request.target(), peer = %peer, "Request");
    } else {
        tracing::info!(method = %request.method(), path = %request.path(), peer = %peer, "Request");
    }
}

/// Write `response` best-effort and close the connection.
async fn finish<S>(mut conn: Connection<S>, response: Response, started: Instant)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let status: StatusCode = response.status();
    if let Err(e) = conn.respond(&response).await {
        tracing::warn!(error = %e, status = status.as_u16(), "Failed to send response");
    }
    conn.close().await;
    metrics::record_response(status.as_str(), started);
}
