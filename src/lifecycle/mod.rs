//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Metrics (optional) → Bind → Router → Accept loop
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → In-flight connections finish
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Listener binds last, after every fallible setup step
//! - Shutdown stops admission only; it does not abort admitted connections

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{serve, StartupError};
