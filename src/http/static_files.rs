//! Static file stage.
//!
//! # Responsibilities
//! - Serve files below the root directory through `ServeDir`
//! - Pass the request on when the file does not exist
//!
//! # Design Decisions
//! - Only GET and HEAD are served; other methods go straight to `next`
//! - No index files and no trailing-slash redirects: a directory is a miss
//! - Transfer details (length, etag, ranges, precondition headers) are left
//!   to `tower-http`

use std::path::Path;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::middleware::Middleware;
use crate::http::pipeline::Next;

/// Serves files from a directory, calling `next` on a miss.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    serve_dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let serve_dir = ServeDir::new(root).append_index_html_on_directories(false);
        Self { serve_dir }
    }

    /// Serve the file at the request path, or continue the chain.
    pub async fn serve(&self, request: Request<Body>, next: Next) -> Response {
        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return next.run(request).await;
        }

        // ServeDir consumes the request; keep the parts so a miss can continue.
        let (parts, body) = request.into_parts();
        let probe = Request::from_parts(parts.clone(), Body::empty());

        let response = match self.serve_dir.clone().oneshot(probe).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            tracing::trace!(path = %parts.uri.path(), "No static file");
            return next.run(Request::from_parts(parts, body)).await;
        }

        response.map(Body::new)
    }
}

impl Middleware for StaticFiles {
    fn call(&self, request: Request<Body>, next: Next) -> BoxFuture<'static, Response> {
        let files = self.clone();
        Box::pin(async move { files.serve(request, next).await })
    }
}
