//! Listener lifecycle: start, stop, restart.
//!
//! # States
//! ```text
//! Stopped → Starting → Listening → Stopping → Stopped
//! Listening → Restarting → Starting
//! Starting → Restarting → Starting   (port in use, retried)
//! ```
//!
//! # Design Decisions
//! - Transitions are serialised by an async mutex; a `start` that is
//!   retrying holds it until the port frees up
//! - `AddrInUse` is retried forever with a fixed delay; no backoff, no cap
//! - `stop` cancels a `start` that is waiting out a busy port
//! - Any other bind failure is returned to the caller and not retried
//! - The configuration is fixed; restart rebinds with the same settings

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::net::listener::{bind_first, resolve, ListenerError};
use crate::net::tls::Credentials;

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Starting,
    Listening(SocketAddr),
    Stopping,
    Restarting,
}

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// `stop` was called while the port was still in use.
    #[error("Start cancelled while waiting for the port")]
    Cancelled,

    /// The server task failed after the listener was bound.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Server task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything needed to (re)bind the listener.
#[derive(Debug, Clone)]
pub struct ListenSettings {
    pub hostname: Option<String>,
    pub port: u16,
    pub credentials: Option<Credentials>,
    pub verbose: bool,
    pub retry_delay: Duration,
    pub shutdown_timeout: Duration,
}

struct Running {
    handle: Handle,
    task: JoinHandle<std::io::Result<()>>,
    local_addr: SocketAddr,
}

/// Owns the listener of one server instance.
pub struct LifecycleManager {
    settings: ListenSettings,
    app: Router,
    running: Mutex<Option<Running>>,
    state: watch::Sender<ServerState>,
    /// Bumped by every `stop`; a retrying start gives up when it changes.
    stops: watch::Sender<u64>,
}

impl LifecycleManager {
    pub fn new(settings: ListenSettings, app: Router) -> Self {
        let (state, _) = watch::channel(ServerState::Stopped);
        let (stops, _) = watch::channel(0);
        Self {
            settings,
            app,
            running: Mutex::new(None),
            state,
            stops,
        }
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Address the listener is bound to, while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self.state() {
            ServerState::Listening(addr) => Some(addr),
            _ => None,
        }
    }

    /// Bind and start serving. Resolves once the listener is bound.
    ///
    /// Already listening: returns the current address.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut stops = self.stops.subscribe();
        let mut running = self.running.lock().await;
        self.start_locked(&mut running, &mut stops).await
    }

    /// Stop serving and release the listener. No-op when stopped.
    ///
    /// A `start` still retrying a busy port returns `ServerError::Cancelled`.
    pub async fn stop(&self) -> Result<(), ServerError> {
        self.stops.send_modify(|n| *n = n.wrapping_add(1));
        let mut running = self.running.lock().await;
        let result = self.stop_locked(&mut running, ServerState::Stopping).await;
        self.state.send_replace(ServerState::Stopped);
        result
    }

    /// Stop, then start again with the same settings.
    pub async fn restart(&self) -> Result<SocketAddr, ServerError> {
        let mut stops = self.stops.subscribe();
        let mut running = self.running.lock().await;
        if let Err(e) = self.stop_locked(&mut running, ServerState::Restarting).await {
            tracing::warn!(error = %e, "Previous listener ended with an error");
        }
        self.start_locked(&mut running, &mut stops).await
    }

    async fn start_locked(
        &self,
        running: &mut Option<Running>,
        stops: &mut watch::Receiver<u64>,
    ) -> Result<SocketAddr, ServerError> {
        if let Some(current) = running.as_ref() {
            return Ok(current.local_addr);
        }

        self.state.send_replace(ServerState::Starting);
        loop {
            match self.listen().await {
                Ok(started) => {
                    let addr = started.local_addr;
                    *running = Some(started);
                    self.state.send_replace(ServerState::Listening(addr));
                    if self.settings.verbose {
                        tracing::info!(
                            address = %addr,
                            tls = self.settings.credentials.is_some(),
                            "SPA server is now accepting requests"
                        );
                    }
                    return Ok(addr);
                }
                Err(e) if e.is_addr_in_use() => {
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = self.settings.retry_delay.as_millis() as u64,
                        "Port in use, retrying"
                    );
                    self.state.send_replace(ServerState::Restarting);
                    tokio::select! {
                        _ = tokio::time::sleep(self.settings.retry_delay) => {}
                        _ = stops.changed() => {
                            if self.settings.verbose {
                                tracing::info!(port = self.settings.port, "Start cancelled by stop");
                            }
                            self.state.send_replace(ServerState::Stopped);
                            return Err(ServerError::Cancelled);
                        }
                    }
                    self.state.send_replace(ServerState::Starting);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start listener");
                    self.state.send_replace(ServerState::Stopped);
                    return Err(e.into());
                }
            }
        }
    }

    async fn stop_locked(
        &self,
        running: &mut Option<Running>,
        transition: ServerState,
    ) -> Result<(), ServerError> {
        let Some(Running { handle, task, local_addr }) = running.take() else {
            return Ok(());
        };

        self.state.send_replace(transition);
        handle.graceful_shutdown(Some(self.settings.shutdown_timeout));
        let result = task.await;

        if self.settings.verbose {
            tracing::info!(address = %local_addr, "SPA server stopped");
        }

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServerError::Serve(e)),
            Err(e) => Err(e.into()),
        }
    }

    async fn listen(&self) -> Result<Running, ListenerError> {
        let candidates = resolve(self.settings.hostname.as_deref(), self.settings.port).await?;
        let tls = match &self.settings.credentials {
            Some(credentials) => Some(credentials.load().await?),
            None => None,
        };
        let (listener, local_addr) = bind_first(&candidates).await?;

        let handle = Handle::new();
        let app = self.app.clone().into_make_service();
        let task = match tls {
            Some(config) => {
                let server = axum_server::from_tcp_rustls(listener, config).handle(handle.clone());
                tokio::spawn(async move { log_exit(server.serve(app).await) })
            }
            None => {
                let server = axum_server::from_tcp(listener).handle(handle.clone());
                tokio::spawn(async move { log_exit(server.serve(app).await) })
            }
        };

        Ok(Running {
            handle,
            task,
            local_addr,
        })
    }
}

fn log_exit(result: std::io::Result<()>) -> std::io::Result<()> {
    if let Err(e) = &result {
        tracing::error!(error = %e, "Server stopped with an error");
    }
    result
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().as_ref() {
            running.handle.shutdown();
        }
    }
}
