//! Byte-transparent relay of a GET to its origin.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{RelayConfig, TimeoutConfig};
use crate::http::{ParsedRequest, RequestError};
use crate::net::Connection;
use crate::proxy::target::Target;

const BODY_CHUNK: usize = 8 * 1024;

/// Forwards requests to the origin named in their target.
#[derive(Debug, Clone)]
pub struct ProxyRelay {
    default_port: u16,
    connect_timeout: Option<Duration>,
}

impl ProxyRelay {
    pub fn new(relay: &RelayConfig, timeouts: &TimeoutConfig) -> Self {
        Self {
            default_port: relay.default_port,
            connect_timeout: timeouts.connect(),
        }
    }

    /// Dial the origin, forward the request and stream the origin's
    /// response back to the client until the origin closes.
    ///
    /// Errors are returned only while nothing has been written to the
    /// client yet, so the caller can still answer with a status. Once
    /// relaying starts, failures are logged and end the exchange.
    /// Returns the number of response bytes relayed.
    pub async fn relay<S>(&self, request: &ParsedRequest, conn: &mut Connection<S>) -> Result<u64, RequestError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let target = Target::from_request(request, self.default_port)?;
        let mut upstream = self.dial(&target).await?;

        tracing::debug!(origin = %target, path = %target.origin_form(), "Origin connected");

        let upstream_err = |source| RequestError::Dial {
            authority: target.to_string(),
            source,
        };
        upstream
            .write_all(target.request_head(request).as_bytes())
            .await
            .map_err(upstream_err)?;
        if request.content_length() > 0 {
            forward_body(conn.body(request), request.content_length(), &mut upstream, upstream_err).await?;
        }
        upstream.flush().await.map_err(upstream_err)?;

        let relayed = match tokio::io::copy(&mut upstream, conn.stream_mut()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(origin = %target, error = %e, "Relay interrupted");
                0
            }
        };
        if let Err(e) = conn.stream_mut().flush().await {
            tracing::warn!(origin = %target, error = %e, "Failed to flush relayed response");
        }
        let _ = upstream.shutdown().await;

        Ok(relayed)
    }

    async fn dial(&self, target: &Target) -> Result<TcpStream, RequestError> {
        let connect = TcpStream::connect((target.host(), target.port()));
        let result = match self.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no connection within {limit:?}"),
                )),
            },
            None => connect.await,
        };
        result.map_err(|source| RequestError::Dial {
            authority: target.to_string(),
            source,
        })
    }
}

/// Copy the declared body upstream. Client-side failures (including a body
/// shorter than declared) are `Io`; upstream write failures go through
/// `upstream_err`.
async fn forward_body<B, U, F>(mut body: B, declared: u64, upstream: &mut U, upstream_err: F) -> Result<(), RequestError>
where
    B: AsyncRead + Unpin,
    U: AsyncWrite + Unpin,
    F: Fn(std::io::Error) -> RequestError,
{
    let mut buf = vec![0u8; BODY_CHUNK];
    let mut forwarded = 0u64;
    loop {
        let n = body.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        upstream.write_all(&buf[..n]).await.map_err(&upstream_err)?;
        forwarded += n as u64;
    }
    if forwarded < declared {
        return Err(RequestError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("client body ended after {forwarded} of {declared} bytes"),
        )));
    }
    Ok(())
}
