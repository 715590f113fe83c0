//! File-serving subsystem.
//!
//! # Data Flow
//! ```text
//! GET /path.ext
//!     → extension allow-list (400 when outside it)
//!     → path.rs (decode, lexical traversal check, symlink confinement)
//!     → read file (404 missing, 500 other I/O)
//!     → content_type.rs (extension → MIME, text/plain fallback)
//!
//! POST /path.ext
//!     → same allow-list and traversal checks
//!     → create parent directories beneath the base
//!     → read Content-Length bytes of body, write file
//! ```

pub mod content_type;
pub mod handler;
pub mod path;

pub use content_type::content_type_for;
pub use handler::FileHandler;
