//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use spa_server::{Fallback, ServerOptions};

/// Fixture directory served by the tests.
pub fn webroot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/webroot")
}

/// Options for a quiet server on an ephemeral loopback port.
pub fn options(fallback: Fallback) -> ServerOptions {
    ServerOptions {
        root: webroot(),
        port: 0,
        hostname: Some("127.0.0.1".to_string()),
        fallback,
        verbose: false,
        retry_delay: Duration::from_millis(50),
        shutdown_timeout: Duration::from_secs(1),
        ..ServerOptions::default()
    }
}

/// HTTP client that never reuses connections across restarts.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A bare GET request.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request through the router without a socket.
pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.unwrap()
}

/// Collect a response into status, content-type, and body.
pub async fn read(response: Response) -> (StatusCode, String, Vec<u8>) {
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

/// Extract the `<title>` of an HTML body.
pub fn title(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let re = regex::Regex::new(r"<title>(.*?)</title>").unwrap();
    re.captures(text).map(|c| c[1].to_string())
}
