//! Fallback dispatch for unmatched requests.
//!
//! # Responsibilities
//! - Hold the configured fallback mode (none, fixed path, rules, function)
//! - Decide per request whether and where to rewrite
//! - Re-run the static file transfer on the rewritten path
//!
//! # Design Decisions
//! - Configured targets are validated when the dispatcher is built
//! - Rule tables are compiled eagerly so specifier errors surface at
//!   construction, not on the first miss
//! - A fixed path applies to every missing request, whatever its type
//! - A function fallback is a black box; a panic in it is not caught

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{Request, Uri};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::config::ConfigError;
use crate::fallback::mime::classify;
use crate::fallback::rules::RuleTable;
use crate::http::middleware::Middleware;
use crate::http::pipeline::Next;
use crate::http::static_files::StaticFiles;

/// Custom fallback resolver supplied by the embedding application.
pub type FallbackFn = Arc<dyn Fn(&Request<Body>) -> Option<String> + Send + Sync>;

/// What to serve when a requested file does not exist.
#[derive(Clone, Default)]
pub enum Fallback {
    /// No fallback: missing files end in 404.
    #[default]
    None,
    /// Serve one path for every missing file.
    Path(String),
    /// Content-type rules, `(specifier, target)` in declaration order.
    Rules(Vec<(String, String)>),
    /// Ask a function; `None` means no fallback for this request.
    Function(FallbackFn),
}

impl Fallback {
    pub fn path(target: impl Into<String>) -> Self {
        Fallback::Path(target.into())
    }

    pub fn rules<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Fallback::Rules(
            rules
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Request<Body>) -> Option<String> + Send + Sync + 'static,
    {
        Fallback::Function(Arc::new(f))
    }
}

impl fmt::Debug for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::None => write!(f, "None"),
            Fallback::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Fallback::Rules(r) => f.debug_tuple("Rules").field(r).finish(),
            Fallback::Function(_) => write!(f, "Function(..)"),
        }
    }
}

/// Outcome of consulting the dispatcher for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Rewrite the request path and serve it as a static file.
    Rewrite(String),
    /// No fallback applies; continue the pipeline.
    Next,
}

/// Recorded on a request whose path was rewritten by the fallback stage.
#[derive(Debug, Clone)]
pub struct FallbackRewrite {
    pub original: Uri,
    pub target: String,
}

enum Mode {
    None,
    Path(String),
    Rules(RuleTable),
    Function(FallbackFn),
}

/// Decides which fallback resource, if any, answers a missing request.
pub struct FallbackDispatcher {
    mode: Mode,
}

impl FallbackDispatcher {
    /// Validate the fallback configuration and compile its rules.
    pub fn new(fallback: Fallback) -> Result<Self, ConfigError> {
        let mode = match fallback {
            Fallback::None => Mode::None,
            Fallback::Path(target) => {
                validate_target(&target)?;
                Mode::Path(target)
            }
            Fallback::Rules(rules) => {
                let table = RuleTable::compile(rules)?;
                for target in table.targets() {
                    validate_target(target)?;
                }
                Mode::Rules(table)
            }
            Fallback::Function(f) => Mode::Function(f),
        };
        Ok(Self { mode })
    }

    /// Decide the outcome for a request whose file was not found.
    pub fn dispatch(&self, request: &Request<Body>) -> Dispatch {
        let target = match &self.mode {
            Mode::None => None,
            Mode::Path(target) => Some(target.clone()),
            Mode::Rules(table) => {
                let content_type = classify(request.uri().path());
                table.lookup(Some(&content_type)).map(str::to_string)
            }
            Mode::Function(f) => f(request),
        };

        match target {
            Some(target) => Dispatch::Rewrite(target),
            None => Dispatch::Next,
        }
    }
}

impl fmt::Debug for FallbackDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &self.mode {
            Mode::None => "none",
            Mode::Path(_) => "path",
            Mode::Rules(_) => "rules",
            Mode::Function(_) => "function",
        };
        f.debug_struct("FallbackDispatcher").field("mode", &mode).finish()
    }
}

/// A fallback target must be an absolute URI path.
pub fn validate_target(target: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidTarget {
        target: target.to_string(),
        reason: reason.to_string(),
    };

    if !target.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }
    target
        .parse::<PathAndQuery>()
        .map_err(|e| invalid(&e.to_string()))?;
    Ok(())
}

/// Point the request at `target`, keeping scheme and authority.
fn rewrite(request: &mut Request<Body>, target: &str) -> Result<(), axum::http::Error> {
    let original = request.uri().clone();
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(target.parse::<PathAndQuery>()?);
    *request.uri_mut() = Uri::from_parts(parts)?;
    request.extensions_mut().insert(FallbackRewrite {
        original,
        target: target.to_string(),
    });
    Ok(())
}

/// The `fallback` core stage of the pipeline.
#[derive(Clone)]
pub struct FallbackStage {
    dispatcher: Arc<FallbackDispatcher>,
    files: StaticFiles,
}

impl FallbackStage {
    pub fn new(dispatcher: Arc<FallbackDispatcher>, files: StaticFiles) -> Self {
        Self { dispatcher, files }
    }

    async fn handle(&self, mut request: Request<Body>, next: Next) -> Response {
        let target = match self.dispatcher.dispatch(&request) {
            Dispatch::Rewrite(target) => target,
            Dispatch::Next => return next.run(request).await,
        };

        let rewritten = validate_target(&target)
            .map_err(|e| e.to_string())
            .and_then(|()| rewrite(&mut request, &target).map_err(|e| e.to_string()));
        if let Err(e) = rewritten {
            tracing::warn!(
                path = %request.uri(),
                target = %target,
                error = %e,
                "Ignoring invalid fallback target"
            );
            return next.run(request).await;
        }

        tracing::debug!(target = %target, "Serving fallback");
        self.files.serve(request, next).await
    }
}

impl Middleware for FallbackStage {
    fn call(&self, request: Request<Body>, next: Next) -> BoxFuture<'static, Response> {
        let stage = self.clone();
        Box::pin(async move { stage.handle(request, next).await })
    }
}
