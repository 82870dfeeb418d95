//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → TraceLayer request spans (http::server)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, filtered by level / RUST_LOG)
//! ```
//!
//! # Design Decisions
//! - Lifecycle info lines are gated by `verbose`
//! - Warnings and errors are always emitted

pub mod logging;

pub use logging::init_logging;
