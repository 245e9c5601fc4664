//! Edge routing decision, evaluated before any page renders.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server runs [`evaluate`] on every navigable request. It sees cookies
//! only (`accessToken`, `userType`), never the persistent client store, and
//! checks presence rather than validity; the backend still authorizes every
//! API call.
//!
//! Evaluation order is significant: root and auth-flow checks run before the
//! protected-prefix check, so a signed-in admin on `/auth/login` is sent to
//! `/admin` before protected-route logic is consulted.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::role::{LOGIN_PATH, Role, dashboard_path_for};

/// Prefixes that bypass the guard entirely.
pub const API_PREFIX: &str = "/api";
pub const STATIC_PREFIXES: &[&str] = &["/pkg", "/assets", "/favicon.ico", "/robots.txt"];

/// Auth-flow pages; signed-in visitors are bounced to their dashboard.
pub const AUTH_PREFIXES: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/verify-otp",
    "/auth/reset-password",
];

/// Pages anyone may view, signed in or not.
pub const PUBLIC_PATHS: &[&str] = &["/about", "/contact", "/privacy", "/terms", "/healthz"];

/// Protected dashboard prefixes and the roles allowed under each.
pub const PROTECTED_PREFIXES: &[(&str, &[Role])] = &[
    ("/admin", &[Role::Admin]),
    ("/employer", &[Role::Employer]),
    ("/undergraduate", &[Role::User]),
];

/// Query parameter carrying the originally requested path to the login page.
pub const REDIRECT_PARAM: &str = "redirect";

/// The two cookies the edge guard reads. Empty values count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeCookies<'a> {
    pub access_token: Option<&'a str>,
    pub user_type: Option<&'a str>,
}

impl<'a> EdgeCookies<'a> {
    #[must_use]
    pub fn new(access_token: Option<&'a str>, user_type: Option<&'a str>) -> Self {
        let present = |v: Option<&'a str>| v.filter(|s| !s.trim().is_empty());
        Self { access_token: present(access_token), user_type: present(user_type) }
    }

    /// Both cookies present and the role recognised. An unknown role would
    /// resolve to the login page itself, so it never counts as signed in.
    fn signed_in(&self) -> bool {
        self.access_token.is_some() && self.user_type.and_then(Role::parse).is_some()
    }

    fn home(&self) -> &'static str {
        dashboard_path_for(self.user_type)
    }
}

/// Outcome of the edge guard for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Pass,
    Redirect(String),
}

impl RouteDecision {
    fn to(path: &str) -> Self {
        Self::Redirect(path.to_owned())
    }

    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Redirect(to) => Some(to),
        }
    }
}

/// Classify `path` against `cookies`.
#[must_use]
pub fn evaluate(path: &str, cookies: EdgeCookies<'_>) -> RouteDecision {
    if is_bypassed(path) {
        return RouteDecision::Pass;
    }

    if path == "/" || AUTH_PREFIXES.iter().any(|prefix| has_prefix(path, prefix)) {
        return if cookies.signed_in() { RouteDecision::to(cookies.home()) } else { RouteDecision::Pass };
    }

    if PUBLIC_PATHS.contains(&path) {
        return RouteDecision::Pass;
    }

    if let Some(allowed) = protected_roles(path) {
        if cookies.access_token.is_none() {
            return RouteDecision::Redirect(login_redirect(path));
        }
        if let Some(raw) = cookies.user_type {
            let permitted = Role::parse(raw).is_some_and(|role| allowed.contains(&role));
            if !permitted {
                return RouteDecision::to(dashboard_path_for(Some(raw)));
            }
        }
        return RouteDecision::Pass;
    }

    if cookies.signed_in() { RouteDecision::to(cookies.home()) } else { RouteDecision::Pass }
}

/// Roles allowed under `path`, if it sits below a protected prefix.
#[must_use]
pub fn protected_roles(path: &str) -> Option<&'static [Role]> {
    PROTECTED_PREFIXES
        .iter()
        .find(|(prefix, _)| has_prefix(path, prefix))
        .map(|(_, roles)| *roles)
}

/// Login URL that returns the visitor to `path` afterwards.
#[must_use]
pub fn login_redirect(path: &str) -> String {
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_PARAM, path)
        .finish();
    format!("{LOGIN_PATH}?{encoded}")
}

/// Pick the post-login destination: the `redirect` target when it is a local
/// path the role may open, otherwise the role's dashboard.
#[must_use]
pub fn post_login_target(role: Role, redirect: Option<&str>) -> String {
    let home = role.dashboard_path();
    let Some(target) = redirect.map(str::trim) else {
        return home.to_owned();
    };
    if !target.starts_with('/') || target.starts_with("//") {
        return home.to_owned();
    }
    let path = target.split(['?', '#']).next().unwrap_or(target);
    match protected_roles(path) {
        Some(allowed) if allowed.contains(&role) => target.to_owned(),
        _ => home.to_owned(),
    }
}

fn is_bypassed(path: &str) -> bool {
    if has_prefix(path, API_PREFIX) || STATIC_PREFIXES.iter().any(|prefix| has_prefix(path, prefix)) {
        return true;
    }
    // Dotted segments below a dashboard prefix are records (`/employer/applicants/jane.doe`), not files.
    if protected_roles(path).is_some() {
        return false;
    }
    path.rsplit('/')
        .next()
        .is_some_and(|segment| segment.rsplit_once('.').is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty()))
}

/// Segment-aware prefix test: `/admin` matches `/admin` and `/admin/x`, not
/// `/administrator`.
fn has_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}
