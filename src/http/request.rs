//! Request parsing.
//!
//! # Responsibilities
//! - Read exactly one request head (request line + headers) from a stream
//! - Enforce head size and header count limits while reading
//! - Resolve the declared body length from `Content-Length`
//! - Leave every byte after the head unread for the body reader
//!
//! # Design Decisions
//! - Header lookups are case-insensitive, first value wins
//! - Conflicting `Content-Length` values are rejected
//! - `Transfer-Encoding` is rejected (no chunked bodies)
//! - Paths are kept raw so `..` segments stay visible, in either target form

use std::fmt;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use url::Url;

use crate::config::LimitsConfig;

/// HTTP request parsing error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("stream ended before the request head was complete")]
    Truncated,
    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),
    #[error("more than {0} header fields")]
    TooManyHeaders(usize),
    #[error("malformed request head: {0}")]
    Syntax(httparse::Error),
    #[error("header value is not valid UTF-8")]
    Encoding,
    #[error("invalid request target {0:?}")]
    Target(String),
    #[error("invalid content-length {0:?}")]
    ContentLength(String),
    #[error("transfer-encoding is not supported")]
    TransferEncoding,
    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// Request method, resolved once after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Any other syntactically valid method.
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(name) => name,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header fields in the order received.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Every value for `name`, in received order.
    pub fn get_all<'s, 'n>(&'s self, name: &'n str) -> impl Iterator<Item = &'s str> + 'n
    where
        's: 'n,
    {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fields with their original name spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed request head. The body stays on the connection and is read
/// through [`crate::net::Connection::body`].
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    method: Method,
    target: String,
    origin_form: String,
    path: String,
    version: String,
    headers: Headers,
    content_length: u64,
    url: Option<Url>,
}

impl ParsedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as sent.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Path and query as sent, without scheme, authority or fragment.
    /// Dot segments and escapes are left untouched.
    pub fn origin_form(&self) -> &str {
        &self.origin_form
    }

    /// Path component of the target, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Declared body length; zero when `Content-Length` is absent.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// The target URL when the request used absolute form.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

/// Read one request head from `reader`.
///
/// Consumes the bytes up to and including the blank line that ends the
/// head, and nothing beyond it. Tokenizing is done by `httparse` once the
/// whole head is buffered.
pub async fn parse_request<R>(reader: &mut R, limits: &LimitsConfig) -> Result<ParsedRequest, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let head = read_head(reader, limits.max_head_bytes).await?;

    let mut slots = vec![httparse::EMPTY_HEADER; limits.max_headers];
    let mut req = httparse::Request::new(&mut slots);
    match req.parse(&head) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => return Err(ParseError::Truncated),
        Err(httparse::Error::TooManyHeaders) => return Err(ParseError::TooManyHeaders(limits.max_headers)),
        Err(e) => return Err(ParseError::Syntax(e)),
    }

    // All three are set once parsing completes.
    let (Some(method), Some(target), Some(minor)) = (req.method, req.path, req.version) else {
        return Err(ParseError::Truncated);
    };

    let mut headers = Headers::default();
    for header in req.headers.iter() {
        let value = std::str::from_utf8(header.value).map_err(|_| ParseError::Encoding)?;
        headers.entries.push((header.name.to_string(), value.to_string()));
    }

    if headers.contains("transfer-encoding") {
        return Err(ParseError::TransferEncoding);
    }
    let content_length = content_length(&headers)?;
    let (origin_form, url) = resolve_target(target)?;
    let path = origin_form.split('?').next().unwrap_or(&origin_form).to_string();

    Ok(ParsedRequest {
        method: Method::from_token(method),
        target: target.to_string(),
        origin_form,
        path,
        version: format!("HTTP/1.{minor}"),
        headers,
        content_length,
        url,
    })
}

/// Buffer lines up to the blank line ending the head, within `limit` bytes.
/// Blank lines before the request line are consumed and dropped.
async fn read_head<R>(reader: &mut R, limit: usize) -> Result<Vec<u8>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut head = Vec::new();
    let mut consumed = 0;
    loop {
        let remaining = limit - consumed;
        let start = head.len();
        let read = (&mut *reader)
            .take(remaining as u64)
            .read_until(b'\n', &mut head)
            .await?;
        consumed += read;

        if !head[start..].ends_with(b"\n") {
            return Err(if read == remaining {
                ParseError::HeadTooLarge(limit)
            } else {
                ParseError::Truncated
            });
        }

        if matches!(&head[start..], b"\n" | b"\r\n") {
            if start > 0 {
                return Ok(head);
            }
            head.clear();
        }
    }
}

fn content_length(headers: &Headers) -> Result<u64, ParseError> {
    let mut declared: Option<u64> = None;
    for value in headers.get_all("content-length") {
        let value = value.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::ContentLength(value.to_string()));
        }
        let length = value
            .parse::<u64>()
            .map_err(|_| ParseError::ContentLength(value.to_string()))?;
        match declared {
            Some(previous) if previous != length => {
                return Err(ParseError::ContentLength(value.to_string()));
            }
            _ => declared = Some(length),
        }
    }
    Ok(declared.unwrap_or(0))
}

/// Split the target into its raw origin form and, for absolute form, the
/// parsed URL. The URL is only used for scheme, host and port.
fn resolve_target(target: &str) -> Result<(String, Option<Url>), ParseError> {
    let without_fragment = target.split('#').next().unwrap_or(target);
    if without_fragment.starts_with('/') {
        return Ok((without_fragment.to_string(), None));
    }
    if let Some((_, rest)) = without_fragment.split_once("://") {
        let url = Url::parse(target).map_err(|_| ParseError::Target(target.to_string()))?;
        if !url.has_host() {
            return Err(ParseError::Target(target.to_string()));
        }
        let origin_form = match rest.find(&['/', '?'][..]) {
            Some(at) if rest[at..].starts_with('?') => format!("/{}", &rest[at..]),
            Some(at) => rest[at..].to_string(),
            None => "/".to_string(),
        };
        return Ok((origin_form, Some(url)));
    }
    Err(ParseError::Target(target.to_string()))
}
