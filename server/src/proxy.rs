//! `/api/*` forwarder.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser talks to one origin. Requests under `/api` are replayed
//! against `BACKEND_URL` with the same method, path, query and body, and a
//! small allow-list of headers. The backend response comes back with its
//! status, body and the headers the client needs.
//!
//! ERROR HANDLING
//! ==============
//! Upstream connection failures map to `502`, timeouts to `504`, and an
//! unreadable or oversized request body to `400`. Backend 4xx/5xx responses
//! are not errors here; they pass through verbatim.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Request headers copied to the backend.
const FORWARD_REQUEST_HEADERS: &[&str] = &["authorization", "content-type", "cookie", "accept"];

/// Response headers copied back to the browser.
const FORWARD_RESPONSE_HEADERS: &[&str] = &["content-type", "set-cookie", "cache-control"];

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
    #[error("request body rejected: {0}")]
    Body(String),
    #[error("backend timed out")]
    Timeout,
    #[error("backend unreachable: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { Self::Timeout } else { Self::Upstream(err.to_string()) }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) | Self::HttpClientBuild(_) => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!(error = %self, %status, "api proxy failure");
        let body = serde_json::json!({ "success": false, "message": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Forward one `/api/*` request to the backend.
///
/// # Errors
///
/// See the module-level error mapping.
pub async fn forward(State(state): State<AppState>, request: Request) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts.uri.path_and_query().map_or(parts.uri.path(), |pq| pq.as_str());
    let url = state.backend_url(path_and_query);
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| ProxyError::Body(e.to_string()))?;

    tracing::debug!(method = %parts.method, path = %parts.uri.path(), "forwarding to backend");

    let upstream = state
        .http
        .request(parts.method, url)
        .headers(copy_headers(&parts.headers, FORWARD_REQUEST_HEADERS))
        .body(bytes)
        .send()
        .await?;

    let status = upstream.status();
    let headers = copy_headers(upstream.headers(), FORWARD_RESPONSE_HEADERS);
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Copy every value of each allowed header, preserving repeats such as
/// multiple `set-cookie` lines.
fn copy_headers(source: &HeaderMap, allowed: &[&'static str]) -> HeaderMap {
    let mut out = HeaderMap::new();
    for &name in allowed {
        for value in source.get_all(name) {
            out.append(HeaderName::from_static(name), value.clone());
        }
    }
    out
}
