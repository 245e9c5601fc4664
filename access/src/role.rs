//! Roles and the role → dashboard path table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every place that turns a role into a destination (edge guard, dashboard
//! guard, post-login navigation, CLI) goes through [`Role::dashboard_path`]
//! or [`dashboard_path_for`]. There is no second copy of this table.

#[cfg(test)]
#[path = "role_test.rs"]
mod role_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Login entry point; also the destination for an unknown role.
pub const LOGIN_PATH: &str = "/auth/login";

/// Account role as spelled by the backend (`userType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employer,
    /// Student account; dashboards live under `/undergraduate`.
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Employer, Role::User];

    /// Parse the wire spelling. Unknown or empty strings yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "admin" => Some(Self::Admin),
            "employer" => Some(Self::Employer),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employer => "employer",
            Self::User => "user",
        }
    }

    /// Dashboard root for this role.
    #[must_use]
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Employer => "/employer",
            Self::User => "/undergraduate",
        }
    }

    /// Human label used by the dashboard shells and access-denied screens.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Employer => "Employer",
            Self::User => "Student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a raw `userType` value to its dashboard, falling back to login.
#[must_use]
pub fn dashboard_path_for(raw: Option<&str>) -> &'static str {
    raw.and_then(Role::parse).map_or(LOGIN_PATH, Role::dashboard_path)
}
