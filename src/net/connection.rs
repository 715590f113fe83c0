//! Connection identity and ownership.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Own the byte stream of one accepted connection
//! - Expose the request head, body and response write on that stream
//! - Close the stream exactly once

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, Take};

use crate::config::LimitsConfig;
use crate::http::request::{parse_request, ParseError, ParsedRequest};
use crate::http::response::Response;

/// Process-wide source of connection IDs; only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Body of the current request: the next `Content-Length` bytes of the stream.
pub type Body<'a, S> = Take<&'a mut BufReader<S>>;

/// One accepted connection, exclusively owned by its handling task.
#[derive(Debug)]
pub struct Connection<S> {
    id: ConnectionId,
    peer: SocketAddr,
    stream: BufReader<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            stream: BufReader::new(stream),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Parse the request head; the body is left on the stream.
    pub async fn read_request(&mut self, limits: &LimitsConfig) -> Result<ParsedRequest, ParseError> {
        parse_request(&mut self.stream, limits).await
    }

    /// Reader limited to the declared body of `request`.
    pub fn body(&mut self, request: &ParsedRequest) -> Body<'_, S> {
        (&mut self.stream).take(request.content_length())
    }

    /// Write a complete response.
    pub async fn respond(&mut self, response: &Response) -> std::io::Result<()> {
        response.write_to(&mut self.stream).await
    }

    /// The underlying stream, for handlers that write raw bytes.
    pub fn stream_mut(&mut self) -> &mut BufReader<S> {
        &mut self.stream
    }

    /// Shut down the write side and drop the stream.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(connection_id = %self.id, error = %e, "Shutdown after close failed");
        }
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use tokio::io::duplex;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
        assert!(id2.as_u64() > id1.as_u64());
        assert_eq!(format!("{}", ConnectionId(7)), "conn-7");
    }

    #[tokio::test]
    async fn reads_request_then_body() {
        let (mut client, server) = duplex(1024);
        client
            .write_all(b"POST /f.txt HTTP/1.0\r\nContent-Length: 4\r\n\r\ndata")
            .await
            .unwrap();

        let mut conn = Connection::new(server, peer());
        let request = conn.read_request(&LimitsConfig::default()).await.unwrap();
        let mut body = Vec::new();
        conn.body(&request).read_to_end(&mut body).await.unwrap();
        assert_eq!(body, b"data");
    }

    #[tokio::test]
    async fn close_signals_end_of_stream() {
        let (mut client, server) = duplex(1024);
        let mut conn = Connection::new(server, peer());
        conn.respond(&Response::status_only(StatusCode::OK)).await.unwrap();
        conn.close().await;

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert!(received.starts_with(b"HTTP/1.0 200 OK\r\n"));
    }
}
