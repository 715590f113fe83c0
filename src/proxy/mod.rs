//! Relay (forward proxy) subsystem.
//!
//! # Data Flow
//! ```text
//! GET http://origin[:port]/resource
//!     → target.rs (origin host/port, default port 80, origin-form line)
//!     → relay.rs dial (failure → 502 written to the client)
//!     → forward request head + declared body
//!     → copy origin bytes to the client until the origin closes
//! ```
//!
//! # Design Decisions
//! - No status or header rewriting on the response path
//! - Only plain `http` targets are relayed

pub mod relay;
pub mod target;

pub use relay::ProxyRelay;
pub use target::Target;
