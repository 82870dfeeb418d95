//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve the configured host name and port
//! - Bind the listening socket
//! - Classify bind failures (port in use vs. everything else)
//!
//! # Design Decisions
//! - Binding happens before the server task is spawned, so bind errors are
//!   reported to the caller of `start` rather than inside a background task
//! - The bound listener is handed to `axum-server` as a std listener
//! - No host name binds `[::]` (dual-stack where the OS allows it), then
//!   `0.0.0.0` when IPv6 is unavailable
//! - Candidates are tried in order; a port in use stops the walk so the
//!   caller can retry the same address

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Host name did not resolve to any address.
    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// TLS credentials could not be loaded.
    #[error("Failed to load TLS credentials: {0}")]
    Tls(#[source] std::io::Error),
}

impl ListenerError {
    /// Returns true if the port is held by another socket.
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            ListenerError::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse
        )
    }
}

/// Resolve `hostname:port` into bind candidates, most preferred first.
///
/// No host name means every interface.
pub async fn resolve(hostname: Option<&str>, port: u16) -> Result<Vec<SocketAddr>, ListenerError> {
    let Some(host) = hostname else {
        return Ok(vec![
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        ]);
    };

    let resolve_err = |source| ListenerError::Resolve {
        host: host.to_string(),
        source,
    };

    let addrs: Vec<_> = tokio::net::lookup_host((host, port))
        .await
        .map_err(resolve_err)?
        .collect();
    if addrs.is_empty() {
        return Err(resolve_err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses returned",
        )));
    }
    Ok(addrs)
}

/// Bind the first candidate that accepts the socket.
///
/// `AddrInUse` is returned immediately; other failures move on to the next
/// candidate and the last one is reported.
pub async fn bind_first(
    candidates: &[SocketAddr],
) -> Result<(std::net::TcpListener, SocketAddr), ListenerError> {
    let mut last = None;
    for &addr in candidates {
        match bind(addr).await {
            Ok(bound) => return Ok(bound),
            Err(e) if e.is_addr_in_use() => return Err(e),
            Err(e) => {
                tracing::debug!(address = %addr, error = %e, "Bind candidate rejected");
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| ListenerError::Resolve {
        host: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to bind"),
    }))
}

/// Bind the listening socket and return it with its local address.
pub async fn bind(addr: SocketAddr) -> Result<(std::net::TcpListener, SocketAddr), ListenerError> {
    let bind_err = |source| ListenerError::Bind { addr, source };

    let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;
    let listener = listener.into_std().map_err(bind_err)?;

    tracing::debug!(address = %local_addr, "Listener bound");
    Ok((listener, local_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_defaults_to_all_interfaces() {
        let addrs = resolve(None, 8888).await.unwrap();
        assert_eq!(addrs.len(), 2);
        assert!(addrs[0].is_ipv6() && addrs[1].is_ipv4());
        assert!(addrs.iter().all(|a| a.ip().is_unspecified() && a.port() == 8888));
    }

    #[tokio::test]
    async fn test_resolve_literal_address() {
        let addrs = resolve(Some("127.0.0.1"), 0).await.unwrap();
        assert_eq!(addrs, ["127.0.0.1:0".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_bind_first_unspecified() {
        let candidates = resolve(None, 0).await.unwrap();
        let (_listener, addr) = bind_first(&candidates).await.unwrap();
        assert!(addr.ip().is_unspecified());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_first_skips_unavailable_address() {
        // TEST-NET-1 is never assigned to a local interface.
        let candidates = ["192.0.2.1:0".parse().unwrap(), "127.0.0.1:0".parse().unwrap()];
        let (_listener, addr) = bind_first(&candidates).await.unwrap();
        assert!(addr.ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_first_stops_at_port_in_use() {
        let (_held, held) = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let other: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let err = bind_first(&[held, other]).await.unwrap_err();
        assert!(err.is_addr_in_use());
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let (_listener, addr) = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_port_in_use_detected() {
        let (_held, addr) = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let err = bind(addr).await.unwrap_err();
        assert!(err.is_addr_in_use(), "unexpected error: {err}");
    }

    #[test]
    fn test_other_errors_not_addr_in_use() {
        let err = ListenerError::Tls(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert!(!err.is_addr_in_use());
    }
}
