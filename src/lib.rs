//! HTTP/1.0 file server and forward proxy with bounded concurrency.
//!
//! ```text
//!   Client ──▶ net::Listener ──▶ net::AdmissionController (N slots)
//!                                   │
//!                                   ▼  one task per connection
//!                              http::parse_request
//!                                   │
//!                              routing::Router
//!                     ┌─────────────┼───────────────┐
//!                     ▼             ▼               ▼
//!              files::get    files::upload    proxy::relay ──▶ Origin
//!                     └─────────────┼───────────────┘
//!                                   ▼
//!                           http::Response ──▶ close, release slot
//! ```

pub mod cli;
pub mod config;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Router, ServiceKind};
