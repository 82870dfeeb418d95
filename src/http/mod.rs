//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! axum-server connection
//!     → server.rs (Router, TraceLayer)
//!     → pipeline.rs (ordered middleware chain)
//!         → static_files.rs (serve-static stage)
//!         → fallback::dispatcher (fallback stage)
//!     → 404 Not Found when nothing answered
//! ```

pub mod middleware;
pub mod pipeline;
pub mod server;
pub mod static_files;

pub use middleware::{Anchor, Middleware, MiddlewareEntry, Position};
pub use pipeline::{Next, Pipeline};
pub use server::{ServerOptions, SpaServer};
pub use static_files::StaticFiles;
