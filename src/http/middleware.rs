//! Middleware entries and pipeline anchors.
//!
//! # Responsibilities
//! - Define the `Middleware` trait every pipeline stage implements
//! - Name the four anchors external middleware is positioned against
//! - Parse string descriptors (`"before"`, `"$start"`, ...) into entries
//!
//! # Design Decisions
//! - Any `Fn(Request, Next) -> Future<Output = Response>` is middleware,
//!   the same shape `axum::middleware::from_fn` accepts
//! - Entries are plain values; ordering is decided by `Pipeline::build`

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::config::ConfigError;
use crate::http::pipeline::Next;

/// A request handler that either answers or passes the request on.
pub trait Middleware: Send + Sync + 'static {
    /// Handle the request, calling `next.run(request)` to continue the chain.
    fn call(&self, request: Request<Body>, next: Next) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request<Body>, next: Next) -> BoxFuture<'static, Response> {
        Box::pin(self(request, next))
    }
}

/// Fixed pipeline positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    PipelineStart,
    ServeStatic,
    Fallback,
    PipelineEnd,
}

impl Anchor {
    /// All anchors in pipeline order.
    pub const ALL: [Anchor; 4] = [
        Anchor::PipelineStart,
        Anchor::ServeStatic,
        Anchor::Fallback,
        Anchor::PipelineEnd,
    ];

    /// Canonical anchor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::PipelineStart => "pipeline-start",
            Anchor::ServeStatic => "serve-static",
            Anchor::Fallback => "fallback",
            Anchor::PipelineEnd => "pipeline-end",
        }
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pipeline-start" | "$start" => Ok(Anchor::PipelineStart),
            "serve-static" => Ok(Anchor::ServeStatic),
            "fallback" => Ok(Anchor::Fallback),
            "pipeline-end" | "$end" => Ok(Anchor::PipelineEnd),
            other => Err(ConfigError::UnknownAnchor(other.to_string())),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an entry runs before or after its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(ConfigError::UnknownPosition(other.to_string())),
        }
    }
}

/// External middleware positioned relative to an anchor.
#[derive(Clone)]
pub struct MiddlewareEntry {
    pub(crate) handler: Arc<dyn Middleware>,
    pub position: Position,
    pub anchor: Anchor,
}

impl MiddlewareEntry {
    /// Create an entry placed before `pipeline-start`.
    pub fn new(handler: impl Middleware) -> Self {
        Self {
            handler: Arc::new(handler),
            position: Position::Before,
            anchor: Anchor::PipelineStart,
        }
    }

    /// Place the entry before `anchor`.
    pub fn before(mut self, anchor: Anchor) -> Self {
        self.position = Position::Before;
        self.anchor = anchor;
        self
    }

    /// Place the entry after `anchor`.
    pub fn after(mut self, anchor: Anchor) -> Self {
        self.position = Position::After;
        self.anchor = anchor;
        self
    }

    /// Build an entry from string descriptors, e.g. `("after", "$start")`.
    pub fn parse(handler: impl Middleware, position: &str, anchor: &str) -> Result<Self, ConfigError> {
        let position = position.parse()?;
        let anchor = anchor.parse()?;
        Ok(Self {
            handler: Arc::new(handler),
            position,
            anchor,
        })
    }

    pub(crate) fn is_at(&self, position: Position, anchor: Anchor) -> bool {
        self.position == position && self.anchor == anchor
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("position", &self.position)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}
