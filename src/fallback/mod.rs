//! Fallback subsystem.
//!
//! # Data Flow
//! ```text
//! Request whose file was not found
//!     → dispatcher.rs (mode: none | path | rules | function)
//!         rules: mime.rs (classify path) → rules.rs (lookup target)
//!     → Rewrite(target): path replaced, static transfer re-run
//!     → Next: pipeline continues toward 404
//! ```
//!
//! # Design Decisions
//! - Rule priority is structural: exact > top-type > `*`
//! - Built once per server, read-only afterwards

pub mod dispatcher;
pub mod mime;
pub mod rules;

pub use dispatcher::{Dispatch, Fallback, FallbackDispatcher, FallbackFn, FallbackRewrite};
pub use mime::classify;
pub use rules::{ContentTypeSpecifier, RuleTable};
