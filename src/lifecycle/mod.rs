//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! start (manager.rs):
//!     Resolve host → Load TLS credentials → Bind → Spawn server task
//!     Port in use → wait retry_delay → bind again
//!
//! stop (manager.rs):
//!     Graceful shutdown → Wait for server task → Listener released
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls stop
//! ```

pub mod manager;
pub mod signals;

pub use manager::{LifecycleManager, ListenSettings, ServerError, ServerState};
pub use signals::shutdown_signal;
