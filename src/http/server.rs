//! SPA server setup.
//!
//! # Responsibilities
//! - Turn `ServerOptions` into a fallback dispatcher and pipeline
//! - Wrap the pipeline in an axum `Router` with request tracing
//! - Expose start/stop/restart through the lifecycle manager
//!
//! # Design Decisions
//! - Every configuration error is raised by `SpaServer::new`
//! - The router is usable on its own for embedding in another app

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, FallbackSetting, ServerConfig};
use crate::fallback::dispatcher::{Fallback, FallbackDispatcher, FallbackStage};
use crate::http::middleware::MiddlewareEntry;
use crate::http::pipeline::Pipeline;
use crate::http::static_files::StaticFiles;
use crate::lifecycle::{LifecycleManager, ListenSettings, ServerError, ServerState};
use crate::net::tls::Credentials;

/// Construction options for a `SpaServer`.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Directory to serve.
    pub root: PathBuf,
    pub port: u16,
    /// Host to bind; all interfaces when `None`.
    pub hostname: Option<String>,
    pub fallback: Fallback,
    /// TLS key and certificate; `Some` switches the listener to TLS.
    pub credentials: Option<Credentials>,
    pub middleware: Vec<MiddlewareEntry>,
    /// Emit lifecycle log lines.
    pub verbose: bool,
    /// Delay between bind attempts while the port is in use.
    pub retry_delay: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 8888,
            hostname: None,
            fallback: Fallback::None,
            credentials: None,
            middleware: Vec::new(),
            verbose: true,
            retry_delay: Duration::from_millis(3000),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerOptions {
    /// Options equivalent to a loaded configuration file.
    pub fn from_config(config: &ServerConfig) -> Self {
        let fallback = match &config.fallback {
            None => Fallback::None,
            Some(FallbackSetting::Path(target)) => Fallback::path(target.clone()),
            Some(FallbackSetting::Rules(rules)) => Fallback::rules(rules.clone()),
        };

        Self {
            root: PathBuf::from(&config.path),
            port: config.port,
            hostname: config.hostname.clone(),
            fallback,
            credentials: config
                .tls
                .as_ref()
                .map(|tls| Credentials::files(&tls.cert_path, &tls.key_path)),
            middleware: Vec::new(),
            verbose: config.verbose,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
        }
    }

    /// Append a middleware entry.
    pub fn with_middleware(mut self, entry: MiddlewareEntry) -> Self {
        self.middleware.push(entry);
        self
    }
}

/// A static file server with fallback dispatch.
pub struct SpaServer {
    pipeline: Pipeline,
    router: Router,
    lifecycle: LifecycleManager,
}

impl SpaServer {
    /// Validate the options and build the pipeline. Does not bind.
    pub fn new(options: ServerOptions) -> Result<Self, ConfigError> {
        let files = StaticFiles::new(&options.root);
        let dispatcher = Arc::new(FallbackDispatcher::new(options.fallback.clone())?);

        tracing::debug!(
            root = ?options.root,
            fallback = ?dispatcher,
            middleware = options.middleware.len(),
            "Building SPA server"
        );

        let pipeline = Pipeline::build(
            &options.middleware,
            Arc::new(files.clone()),
            Arc::new(FallbackStage::new(dispatcher, files)),
        );
        let router = Self::build_router(pipeline.clone());

        let settings = ListenSettings {
            hostname: options.hostname,
            port: options.port,
            credentials: options.credentials,
            verbose: options.verbose,
            retry_delay: options.retry_delay,
            shutdown_timeout: options.shutdown_timeout,
        };

        Ok(Self {
            pipeline,
            lifecycle: LifecycleManager::new(settings, router.clone()),
            router,
        })
    }

    /// Build the Axum router around the pipeline.
    fn build_router(pipeline: Pipeline) -> Router {
        Router::new()
            .fallback(move |request: Request<Body>| {
                let pipeline = pipeline.clone();
                async move { pipeline.handle(request).await }
            })
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the listener and start serving.
    pub async fn start(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.lifecycle.start().await
    }

    /// Stop serving and release the listener. Cancels a start waiting on a busy port.
    pub async fn stop(&self) -> Result<(), ServerError> {
        self.lifecycle.stop().await
    }

    /// Stop and start again with the same configuration.
    pub async fn restart(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.lifecycle.restart().await
    }

    pub fn state(&self) -> ServerState {
        self.lifecycle.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.lifecycle.subscribe()
    }

    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.lifecycle.local_addr()
    }

    /// The handler chain, for embedding.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The router served by the listener, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
