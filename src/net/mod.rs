//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerOptions (hostname, port, credentials)
//!     → listener.rs (resolve, bind, classify bind errors)
//!     → tls.rs (optional rustls configuration)
//!     → axum-server (accept loop, HTTP/1.1 and HTTP/2)
//! ```
//!
//! # Design Decisions
//! - TLS is optional and handled transparently by axum-server
//! - Port-in-use is distinguishable from other bind failures

pub mod listener;
pub mod tls;

pub use listener::ListenerError;
pub use tls::Credentials;
