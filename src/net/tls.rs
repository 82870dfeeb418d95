//! TLS credentials.

use std::fmt;
use std::path::{Path, PathBuf};

use axum_server::tls_rustls::RustlsConfig;

use crate::net::listener::ListenerError;

/// Key and certificate material for a TLS listener.
#[derive(Clone)]
pub enum Credentials {
    /// PEM-encoded certificate chain and private key.
    Pem { cert: Vec<u8>, key: Vec<u8> },
    /// Paths to PEM files.
    Files { cert_path: PathBuf, key_path: PathBuf },
    /// An already built rustls configuration.
    Rustls(RustlsConfig),
}

impl Credentials {
    pub fn files(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Credentials::Files {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// Build the rustls configuration for the listener.
    pub async fn load(&self) -> Result<RustlsConfig, ListenerError> {
        match self {
            Credentials::Pem { cert, key } => RustlsConfig::from_pem(cert.clone(), key.clone())
                .await
                .map_err(ListenerError::Tls),
            Credentials::Files { cert_path, key_path } => load_tls_config(cert_path, key_path)
                .await
                .map_err(ListenerError::Tls),
            Credentials::Rustls(config) => Ok(config.clone()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Pem { .. } => write!(f, "Pem(..)"),
            Credentials::Files { cert_path, key_path } => f
                .debug_struct("Files")
                .field("cert_path", cert_path)
                .field("key_path", key_path)
                .finish(),
            Credentials::Rustls(_) => write!(f, "Rustls(..)"),
        }
    }
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}
