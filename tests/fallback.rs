//! Fallback behaviour through the full router, without a socket.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use regex::Regex;

use common::{get, options, read, send, title, webroot};
use spa_server::{Fallback, SpaServer};

const APPLICATION: &str = "This is the application.html file!";
const NOT_FOUND: &str = "Resource is not found!";

fn server(fallback: Fallback) -> SpaServer {
    SpaServer::new(options(fallback)).unwrap()
}

fn rules() -> Fallback {
    Fallback::rules([
        ("text/html", "/application.html"),
        ("image/*", "/images/lockness.jpg"),
        ("*", "/404.html"),
    ])
}

#[tokio::test]
async fn test_existing_file_served_unchanged() {
    let server = server(rules());
    let (status, content_type, body) = read(send(server.router(), get("/app.js")).await).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.contains("javascript"));
    assert_eq!(body, std::fs::read(webroot().join("app.js")).unwrap());
}

#[tokio::test]
async fn test_no_fallback_is_404() {
    let server = server(Fallback::None);
    for uri in ["/missing.html", "/missing", "/images/missing.png"] {
        let response = send(server.router(), get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn test_fixed_path_for_every_missing_file() {
    let server = server(Fallback::path("/application.html"));
    for uri in ["/missing.html", "/deep/link/route", "/missing.json", "/logo.png"] {
        let (status, content_type, body) = read(send(server.router(), get(uri)).await).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(content_type.starts_with("text/html"), "{uri}");
        assert_eq!(title(&body).as_deref(), Some(APPLICATION), "{uri}");
    }
}

#[tokio::test]
async fn test_rules_html_and_extensionless() {
    let server = server(rules());
    for uri in ["/missing.html", "/users/42/profile"] {
        let (status, _, body) = read(send(server.router(), get(uri)).await).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(title(&body).as_deref(), Some(APPLICATION), "{uri}");
    }
}

#[tokio::test]
async fn test_rules_image_by_top_type() {
    let server = server(rules());
    let expected = std::fs::read(webroot().join("images/lockness.jpg")).unwrap();

    for uri in ["/missing.jpg", "/assets/missing.png"] {
        let (status, content_type, body) = read(send(server.router(), get(uri)).await).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(content_type, "image/jpeg", "{uri}");
        assert_eq!(body.len(), expected.len(), "{uri}");
    }
}

#[tokio::test]
async fn test_rules_global_catch_all() {
    let server = server(rules());
    let (status, _, body) = read(send(server.router(), get("/api/missing.json")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(title(&body).as_deref(), Some(NOT_FOUND));
}

#[tokio::test]
async fn test_rules_without_catch_all_fall_through() {
    let server = server(Fallback::rules([("text/html", "/application.html")]));
    let response = send(server.router(), get("/missing.json")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exact_rule_beats_top_type() {
    let server = server(Fallback::rules([
        ("image/*", "/images/lockness.jpg"),
        ("image/png", "/404.html"),
    ]));
    let (_, content_type, body) = read(send(server.router(), get("/logo.png")).await).await;
    assert!(content_type.starts_with("text/html"));
    assert_eq!(title(&body).as_deref(), Some(NOT_FOUND));

    let (_, content_type, _) = read(send(server.router(), get("/photo.gif")).await).await;
    assert_eq!(content_type, "image/jpeg");
}

#[tokio::test]
async fn test_function_fallback() {
    let html = Regex::new(r"\.html?$").unwrap();
    let server = server(Fallback::function(move |request| {
        html.is_match(request.uri().path())
            .then(|| "/application.html".to_string())
    }));

    let (status, _, body) = read(send(server.router(), get("/page.htm")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(title(&body).as_deref(), Some(APPLICATION));

    let response = send(server.router(), get("/style.css")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_function_returning_invalid_target_falls_through() {
    let server = server(Fallback::function(|_| Some("application.html".to_string())));
    let response = send(server.router(), get("/missing.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_fallback_target_is_404() {
    let server = server(Fallback::path("/does-not-exist.html"));
    let response = send(server.router(), get("/missing.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_is_not_rewritten() {
    let server = server(Fallback::path("/application.html"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/missing.html")
        .body(Body::empty())
        .unwrap();
    let response = send(server.router(), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_gets_headers_only() {
    let server = server(Fallback::path("/application.html"));
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/missing")
        .body(Body::empty())
        .unwrap();
    let (status, content_type, body) = read(send(server.router(), request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.is_empty());
}

#[test]
fn test_invalid_rules_rejected_at_construction() {
    assert!(SpaServer::new(options(Fallback::rules([("*/json", "/404.html")]))).is_err());
    assert!(SpaServer::new(options(Fallback::rules([("text/html", "index.html")]))).is_err());
    assert!(SpaServer::new(options(Fallback::path("index.html"))).is_err());
}
