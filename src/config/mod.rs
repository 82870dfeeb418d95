//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → ServerOptions::from_config → SpaServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no reconfiguration while running
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Handlers and function fallbacks are code, so they are only available
//!   through `ServerOptions`, never from a file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{FallbackSetting, ServerConfig, TlsConfig};
pub use validation::ValidationError;
