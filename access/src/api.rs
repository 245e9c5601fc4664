//! Backend wire types and endpoint paths.
//!
//! DESIGN
//! ======
//! Every backend response shares one envelope (`success`, `message`, `data`,
//! plus optional paging counters on list endpoints). Payload shapes are kept
//! lenient where the backend is known to vary, e.g. refresh responses carry
//! the token pair either under `data.tokens` or directly under `data`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::session::{TokenPair, UserRecord};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REFRESH_ENDPOINT: &str = "/api/auth/refresh-token";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const ME_ENDPOINT: &str = "/api/auth/me";

/// Standard backend response envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub user_type: Role,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserRecord,
    pub user_type: Role,
    pub tokens: TokenPair,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh payload: `{tokens:{..}}` or the bare pair.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RefreshData {
    Wrapped { tokens: TokenPair },
    Bare(TokenPair),
}

impl RefreshData {
    #[must_use]
    pub fn into_tokens(self) -> TokenPair {
        match self {
            Self::Wrapped { tokens } | Self::Bare(tokens) => tokens,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeData {
    pub user: UserRecord,
}

/// HTTP method subset used against the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Transport-neutral request description.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API origin, e.g. `/api/auth/me`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::Get, path: path.into(), bearer: None, body: None }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::Post, path: path.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// Raw response: status plus body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort `message` from an error body.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&self.body)
            .ok()
            .and_then(|env| env.message)
            .filter(|m| !m.trim().is_empty())
    }
}
