//! Response serialization.
//!
//! # Responsibilities
//! - Hold a status, content type and fully-buffered body
//! - Serialize the HTTP/1.0 status line and fixed header set
//! - Map status codes to their canonical reason phrase
//!
//! # Design Decisions
//! - Body length is known before the head is written (no chunking)
//! - Error responses carry `<code> <reason>` as a plain-text body

use std::borrow::Cow;

use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const TEXT_PLAIN: &str = "text/plain";

/// A complete response ready to be written to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    content_type: Cow<'static, str>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, content_type: impl Into<Cow<'static, str>>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
        }
    }

    /// 200 with the given body.
    pub fn ok(content_type: impl Into<Cow<'static, str>>, body: Vec<u8>) -> Self {
        Self::new(StatusCode::OK, content_type, body)
    }

    /// A plain-text response whose body is the status line text, e.g. `404 Not Found`.
    pub fn status_only(status: StatusCode) -> Self {
        let body = format!("{} {}", status.as_u16(), reason(status));
        Self::new(status, TEXT_PLAIN, body.into_bytes())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Status line and headers, including the terminating blank line.
    pub fn head(&self) -> String {
        format!(
            "HTTP/1.0 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.status.as_u16(),
            reason(self.status),
            self.content_type,
            self.body.len()
        )
    }

    /// Write head and body, then flush.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(self.head().as_bytes()).await?;
        if !self.body.is_empty() {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}
