//! Ordered handler chain.
//!
//! # Data Flow
//! ```text
//! before-start → after-start
//!     → before-static → SERVE-STATIC → after-static
//!     → before-fallback → FALLBACK → after-fallback
//!     → before-end → after-end
//!     → 404 Not Found
//! ```
//!
//! # Design Decisions
//! - Built once from the full entry list; no global registration
//! - Immutable after `build`, shared via `Arc` across requests
//! - A stage that never calls `next` ends the chain

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::middleware::{Anchor, Middleware, MiddlewareEntry, Position};

/// The remainder of the chain after the current stage.
pub struct Next {
    stages: Arc<[Arc<dyn Middleware>]>,
    index: usize,
}

impl Next {
    /// Run the next stage, or the not-found terminal if none remain.
    pub async fn run(mut self, request: Request<Body>) -> Response {
        match self.stages.get(self.index).cloned() {
            Some(stage) => {
                self.index += 1;
                stage.call(request, self).await
            }
            None => not_found(),
        }
    }
}

/// Terminal response once every stage has passed.
fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// An immutable, ordered middleware chain.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Middleware>]>,
}

impl Pipeline {
    /// Assemble the chain around the two core stages.
    ///
    /// At every anchor, in order: `Before` entries in the order given, the
    /// core stage (static and fallback anchors only), then `After` entries.
    pub fn build(
        entries: &[MiddlewareEntry],
        serve_static: Arc<dyn Middleware>,
        fallback: Arc<dyn Middleware>,
    ) -> Self {
        let mut stages: Vec<Arc<dyn Middleware>> = Vec::with_capacity(entries.len() + 2);

        for anchor in Anchor::ALL {
            stages.extend(at(entries, Position::Before, anchor));
            match anchor {
                Anchor::ServeStatic => stages.push(Arc::clone(&serve_static)),
                Anchor::Fallback => stages.push(Arc::clone(&fallback)),
                Anchor::PipelineStart | Anchor::PipelineEnd => {}
            }
            stages.extend(at(entries, Position::After, anchor));
        }

        tracing::debug!(
            stages = stages.len(),
            external = entries.len(),
            "Middleware pipeline built"
        );

        Self {
            stages: stages.into(),
        }
    }

    /// Run a request through the whole chain.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let next = Next {
            stages: Arc::clone(&self.stages),
            index: 0,
        };
        next.run(request).await
    }

    /// Number of stages, core stages included.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn at(
    entries: &[MiddlewareEntry],
    position: Position,
    anchor: Anchor,
) -> impl Iterator<Item = Arc<dyn Middleware>> + '_ {
    entries
        .iter()
        .filter(move |entry| entry.is_at(position, anchor))
        .map(|entry| Arc::clone(&entry.handler))
}
