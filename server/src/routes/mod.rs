//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the whole frontend origin: `/api/*` is forwarded
//! to the backend, `/healthz` answers locally, `/pkg/*` serves the compiled
//! WASM bundle, and everything else renders through Leptos SSR. The edge
//! guard wraps all of it so redirects happen before any page renders.


use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{any, get};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::edge;
use crate::proxy;
use crate::state::AppState;

/// API proxy and health routes, without the SSR app.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", any(proxy::forward))
        .route("/api/{*rest}", any(proxy::forward))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Wrap `router` with the edge guard and HTTP tracing.
pub fn guarded(router: Router) -> Router {
    router
        .layer(middleware::from_fn(edge::guard))
        .layer(TraceLayer::new_for_http())
}

/// Full frontend: API proxy + static bundle + Leptos SSR, behind the edge
/// guard.
///
/// # Errors
///
/// Returns an error if the Leptos configuration cannot be loaded from the
/// `LEPTOS_*` environment that `cargo leptos` sets from
/// `[workspace.metadata.leptos]`.
pub fn app(state: AppState) -> Result<Router, String> {
    let conf = get_configuration(None).map_err(|e| format!("leptos configuration: {e}"))?;
    let leptos_options = conf.leptos_options;
    let routes = generate_route_list(client::app::App);

    let leptos_router = Router::new()
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || client::app::shell(opts.clone())
        })
        .with_state(leptos_options.clone());

    // Leptos static assets (WASM, CSS, JS) live under the site root.
    let site_root_path = PathBuf::from(leptos_options.site_root.as_ref());

    let router = api_routes(state)
        .merge(leptos_router)
        .nest_service("/pkg", ServeDir::new(site_root_path.join("pkg")))
        .layer(CompressionLayer::new());
    Ok(guarded(router))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
