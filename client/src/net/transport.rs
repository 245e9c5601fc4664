//! Browser HTTP transport for the auth client.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net` against the same
//! origin, which the edge server forwards to the backend. Server-side (SSR):
//! a stub that reports the backend unreachable, since auth calls are only
//! meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every HTTP status is a response; only a failed fetch or the request
//! timeout is a `TransportError`. Status classification is the auth client's
//! job.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use access::api::{ApiRequest, ApiResponse};
use access::client::TransportError;

/// Abandon a request that has not answered within this many seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[cfg(any(test, feature = "hydrate"))]
fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

/// A failed send or body read: no usable response arrived.
#[cfg(any(test, feature = "hydrate"))]
fn unreachable(err: impl std::fmt::Display) -> TransportError {
    TransportError::Unreachable(err.to_string())
}

/// Body text, or the read failure as a transport error. An unreadable body
/// is not an empty one.
#[cfg(any(test, feature = "hydrate"))]
fn body_text<E: std::fmt::Display>(read: Result<String, E>) -> Result<String, TransportError> {
    read.map_err(unreachable)
}

#[cfg(feature = "hydrate")]
async fn send_once(request: ApiRequest) -> Result<ApiResponse, TransportError> {
    use access::api::Method;
    use gloo_net::http::Request;

    let mut builder = match request.method {
        Method::Get => Request::get(&request.path),
        Method::Post => Request::post(&request.path),
    };
    if let Some(token) = request.bearer.as_deref() {
        builder = builder.header("Authorization", &bearer_value(token));
    }
    let prepared = match &request.body {
        Some(body) => builder.json(body).map_err(unreachable)?,
        None => builder.build().map_err(unreachable)?,
    };

    let resp = prepared.send().await.map_err(unreachable)?;
    let status = resp.status();
    let body = body_text(resp.text().await)?;
    Ok(ApiResponse::new(status, body))
}

#[async_trait::async_trait(?Send)]
impl access::AuthTransport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use futures::future::{Either, select};

            let call = Box::pin(send_once(request));
            let deadline = gloo_timers::future::sleep(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS));
            match select(call, Box::pin(deadline)).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(TransportError::Timeout),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(TransportError::Unreachable("not available on server".to_owned()))
        }
    }
}
