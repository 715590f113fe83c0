//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, errors reported but never fatal)
//!     → admission.rs (take a slot; blocks the accept loop when full)
//!     → connection.rs (exclusive ownership, one request, close)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Admission is a value owned by the server, not global state
//! - Slots are released by drop, so every exit path returns them
//! - Connections are generic over the stream for in-memory testing

pub mod admission;
pub mod connection;
pub mod listener;

pub use admission::{AdmissionController, AdmissionSlot};
pub use connection::{Body, Connection, ConnectionId};
pub use listener::{Listener, ListenerError};
