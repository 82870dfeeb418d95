//! SPA server binary.
//!
//! ```text
//! CLI flags ─┐
//!            ├─▶ ServerConfig ─▶ validate ─▶ SpaServer::new ─▶ start
//! config ────┘                                                  │
//!                                        SIGINT/SIGTERM ─▶ stop ┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use spa_server::config::validation::validate_config;
use spa_server::config::{read_config, ConfigError, FallbackSetting, ServerConfig, TlsConfig};
use spa_server::lifecycle::shutdown_signal;
use spa_server::observability::init_logging;
use spa_server::{ServerOptions, SpaServer};

/// Static file server with single-page application fallbacks.
#[derive(Debug, Parser)]
#[command(name = "spa-server", version, about)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve.
    #[arg(short, long)]
    path: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Host name or address to bind.
    #[arg(long)]
    hostname: Option<String>,

    /// Serve this path for every missing file.
    #[arg(long, conflicts_with = "rule")]
    fallback: Option<String>,

    /// Content-type rule, e.g. `text/html=/index.html`. Repeatable.
    #[arg(long = "rule", value_name = "SPECIFIER=PATH")]
    rule: Vec<String>,

    /// TLS certificate (PEM).
    #[arg(long, requires = "key")]
    cert: Option<String>,

    /// TLS private key (PEM).
    #[arg(long, requires = "cert")]
    key: Option<String>,

    /// Suppress lifecycle log lines.
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(path) = self.path {
            config.path = path;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.hostname.is_some() {
            config.hostname = self.hostname;
        }
        if let Some(target) = self.fallback {
            config.fallback = Some(FallbackSetting::Path(target));
        }
        if !self.rule.is_empty() {
            config.fallback = Some(FallbackSetting::Rules(parse_rules(&self.rule)?));
        }
        if let (Some(cert_path), Some(key_path)) = (self.cert, self.key) {
            config.tls = Some(TlsConfig { cert_path, key_path });
        }
        if self.quiet {
            config.verbose = false;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

fn parse_rules(rules: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    rules
        .iter()
        .map(|rule| {
            rule.split_once('=')
                .map(|(specifier, target)| (specifier.trim().to_string(), target.trim().to_string()))
                .ok_or_else(|| ConfigError::InvalidSpecifier(rule.clone()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("spa-server: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);

    tracing::debug!(
        path = %config.path,
        port = config.port,
        hostname = ?config.hostname,
        tls = config.tls.is_some(),
        "Configuration loaded"
    );

    let server = match SpaServer::new(ServerOptions::from_config(&config)) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        tracing::error!(error = %e, "Failed to start server");
        return ExitCode::FAILURE;
    }

    shutdown_signal().await;

    if let Err(e) = server.stop().await {
        tracing::error!(error = %e, "Shutdown did not complete cleanly");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
