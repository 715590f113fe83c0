//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted connection
//!     → request.rs (parse one request head, resolve body length)
//!     → routing (method → handler)
//!     → files / proxy handlers
//!     → response.rs (status line, fixed headers, body)
//!     → server.rs closes the connection and releases the slot
//! ```
//!
//! # Design Decisions
//! - HTTP/1.0 contract: one request, one response, close
//! - Failures become responses at the connection boundary (error.rs)

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::RequestError;
pub use request::{parse_request, Headers, Method, ParseError, ParsedRequest};
pub use response::Response;
pub use server::{serve_connection, HttpServer};
