use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request as HttpRequest, StatusCode, header};
use axum::routing::{any, get, post};
use tower::ServiceExt;

use super::*;
use crate::config::ServerConfig;

/// Fake backend on an ephemeral port; returns its origin.
async fn spawn_backend() -> String {
    let backend = Router::new()
        .route(
            "/api/auth/login",
            post(|body: String| async move {
                let mut headers = HeaderMap::new();
                headers.append(header::SET_COOKIE, "a=1".parse().unwrap());
                headers.append(header::SET_COOKIE, "b=2".parse().unwrap());
                headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
                (StatusCode::OK, headers, body)
            }),
        )
        .route(
            "/api/auth/me",
            get(|headers: HeaderMap| async move {
                match headers.get(header::AUTHORIZATION) {
                    Some(v) if v == "Bearer acc-1" => (StatusCode::OK, "me".to_owned()),
                    _ => (StatusCode::UNAUTHORIZED, r#"{"success":false,"message":"no token"}"#.to_owned()),
                }
            }),
        )
        .route(
            "/api/echo",
            any(|request: axum::extract::Request| async move {
                format!("{} {}", request.method(), request.uri())
            }),
        )
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend).await.unwrap();
    });
    format!("http://{addr}")
}

fn proxy_app(backend_url: String, timeout: Duration) -> Router {
    let config = ServerConfig { port: 0, backend_url, proxy_timeout: timeout };
    crate::routes::api_routes(AppState::new(config).unwrap())
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn forwards_body_and_all_set_cookie_lines() {
    let app = proxy_app(spawn_backend().await, Duration::from_secs(5));
    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"a@b.io"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    assert_eq!(body_text(response).await, r#"{"email":"a@b.io"}"#);
}

#[tokio::test]
async fn forwards_authorization_and_passes_backend_errors_through() {
    let app = proxy_app(spawn_backend().await, Duration::from_secs(5));

    let ok = HttpRequest::get("/api/auth/me").header(header::AUTHORIZATION, "Bearer acc-1").body(Body::empty()).unwrap();
    assert_eq!(app.clone().oneshot(ok).await.unwrap().status(), StatusCode::OK);

    let denied = HttpRequest::get("/api/auth/me").body(Body::empty()).unwrap();
    let response = app.oneshot(denied).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("no token"));
}

#[tokio::test]
async fn preserves_method_and_query() {
    let app = proxy_app(spawn_backend().await, Duration::from_secs(5));
    let request = HttpRequest::builder()
        .method(Method::DELETE)
        .uri("/api/echo?page=2&limit=10")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(body_text(response).await, "DELETE /api/echo?page=2&limit=10");
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = proxy_app(format!("http://{addr}"), Duration::from_secs(5));

    let response = app.oneshot(HttpRequest::get("/api/auth/me").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("\"success\":false"));
}

#[tokio::test]
async fn slow_backend_is_gateway_timeout() {
    let app = proxy_app(spawn_backend().await, Duration::from_millis(200));
    let response = app.oneshot(HttpRequest::get("/api/slow").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[test]
fn proxy_error_status_mapping() {
    assert_eq!(ProxyError::Body("too big".into()).into_response().status(), StatusCode::BAD_REQUEST);
    assert_eq!(ProxyError::Timeout.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(ProxyError::Upstream("refused".into()).into_response().status(), StatusCode::BAD_GATEWAY);
}
