//! Render-time dashboard guard decision.
//!
//! DESIGN
//! ======
//! The edge guard has already redirected most wrong-role visitors before a
//! page renders; this check covers client-side navigation and stale cookies.
//! It never navigates on its own. Every outcome is a view the UI renders,
//! with links the visitor follows manually.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::context::AuthState;
use crate::role::{LOGIN_PATH, Role};

/// What a guarded dashboard region should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    /// Session validation still in flight.
    Loading,
    /// No session; show a prompt linking to the login page.
    AuthenticationRequired,
    /// Signed in with a role outside the allowed list.
    AccessDenied { required: Vec<Role>, actual: Option<Role> },
    /// Render the children.
    Granted,
}

impl DashboardView {
    /// Where the "go home" / "sign in" action of this view points.
    #[must_use]
    pub fn home_path(&self) -> &'static str {
        match self {
            Self::AccessDenied { actual: Some(role), .. } => role.dashboard_path(),
            Self::Loading | Self::AuthenticationRequired | Self::AccessDenied { actual: None, .. } => LOGIN_PATH,
            Self::Granted => "/",
        }
    }

    /// Comma-separated labels of the roles allowed here, for the denial view.
    #[must_use]
    pub fn required_labels(&self) -> String {
        match self {
            Self::AccessDenied { required, .. } => {
                required.iter().map(|r| r.label()).collect::<Vec<_>>().join(", ")
            }
            _ => String::new(),
        }
    }
}

/// Decide what to render for `state`; `allowed` of `None` admits any
/// authenticated role.
#[must_use]
pub fn evaluate(state: &AuthState, allowed: Option<&[Role]>) -> DashboardView {
    if state.is_loading {
        return DashboardView::Loading;
    }
    if !state.is_authenticated {
        return DashboardView::AuthenticationRequired;
    }
    match allowed {
        Some(roles) if !state.role.is_some_and(|role| roles.contains(&role)) => {
            DashboardView::AccessDenied { required: roles.to_vec(), actual: state.role }
        }
        _ => DashboardView::Granted,
    }
}
