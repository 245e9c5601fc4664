//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! edge server keeps no session state of its own: it holds the parsed config
//! and one pooled HTTP client for forwarding `/api/*` to the backend.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::proxy::ProxyError;

pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Shared application state. Clone is required by Axum; inner fields are
/// Arc-wrapped or cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ServerConfig) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .timeout(config.proxy_timeout)
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProxyError::HttpClientBuild(e.to_string()))?;
        Ok(Self { config: Arc::new(config), http })
    }

    /// Absolute backend URL for an incoming path and query.
    #[must_use]
    pub fn backend_url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.config.backend_url)
    }
}
