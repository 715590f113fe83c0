//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request method
//!     → router.rs (deployment handler set)
//!     → Route: FileGet | FileUpload | Relay | NotImplemented
//!
//! File server:  GET → FileGet, POST → FileUpload, other → 501
//! Proxy:        GET → Relay, other → 501
//! ```
//!
//! # Design Decisions
//! - One transition per connection, no loop
//! - The two deployments are two instantiations of the same router

pub mod router;

pub use router::{Route, Router, ServiceKind};
