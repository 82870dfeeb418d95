//! Static file server for single-page applications.
//!
//! Serves a directory and, when a requested file does not exist, answers
//! with a configurable fallback resource instead of a bare 404.

pub mod config;
pub mod fallback;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::{ConfigError, ServerConfig};
pub use fallback::Fallback;
pub use http::{Anchor, Middleware, MiddlewareEntry, Next, Pipeline, ServerOptions, SpaServer};
pub use lifecycle::{ServerError, ServerState};
pub use net::Credentials;
