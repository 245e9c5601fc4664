//! Session model: tokens, role and the role-dependent user record.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session role {session} does not match user record role {user}")]
    RoleMismatch { session: Role, user: Role },
    #[error("access token is empty")]
    MissingAccessToken,
}

/// Bearer credential pair issued by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Profile of the signed-in account.
///
/// Role-specific fields the layer does not interpret are kept in `extra` so a
/// stored record reads back exactly as it was written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default, alias = "userType", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Name to greet the user with; falls back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() { &self.email } else { &self.name }
    }
}

/// Authenticated identity for the current browser context.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub tokens: TokenPair,
    pub role: Role,
    pub user: UserRecord,
}

impl Session {
    /// Assemble a session, stamping `role` onto the user record when the
    /// backend omitted it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RoleMismatch`] when the record carries a
    /// different role, or [`SessionError::MissingAccessToken`] for an empty
    /// access token.
    pub fn new(tokens: TokenPair, role: Role, mut user: UserRecord) -> Result<Self, SessionError> {
        if tokens.access_token.trim().is_empty() {
            return Err(SessionError::MissingAccessToken);
        }
        match user.role {
            Some(user_role) if user_role != role => {
                return Err(SessionError::RoleMismatch { session: role, user: user_role });
            }
            Some(_) => {}
            None => user.role = Some(role),
        }
        Ok(Self { tokens, role, user })
    }

    /// Copy of this session with refreshed tokens; role and user are kept.
    #[must_use]
    pub fn with_tokens(&self, tokens: TokenPair) -> Self {
        Self { tokens, role: self.role, user: self.user.clone() }
    }
}
