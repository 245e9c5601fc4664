//! Edge router guard middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps the whole router. Every request's path and its `accessToken` /
//! `userType` cookies go through [`access::routes::evaluate`]; a redirect
//! decision short-circuits with `307 Temporary Redirect`, a pass decision
//! hands the request to the inner service untouched.
//!
//! The guard checks cookie presence only. Token validity is the backend's
//! concern on every `/api/*` call.

#[cfg(test)]
#[path = "edge_test.rs"]
mod edge_test;

use access::routes::{EdgeCookies, RouteDecision, evaluate};
use access::store::{ACCESS_TOKEN_KEY, USER_TYPE_KEY};
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// `axum::middleware::from_fn` entry point.
pub async fn guard(request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookies = EdgeCookies::new(
        jar.get(ACCESS_TOKEN_KEY).map(Cookie::value),
        jar.get(USER_TYPE_KEY).map(Cookie::value),
    );

    match evaluate(request.uri().path(), cookies) {
        RouteDecision::Pass => next.run(request).await,
        RouteDecision::Redirect(location) => {
            tracing::debug!(path = %request.uri().path(), %location, "edge guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
