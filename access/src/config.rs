//! Cookie TTL policy, read from the environment by the binaries.
//!
//! One max-age per cookie, applied by every write. The defaults are
//! `accessToken`/`userType` 30 days and `refreshToken` 7 days.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use time::Duration;

pub const DEFAULT_ACCESS_COOKIE_DAYS: i64 = 30;
pub const DEFAULT_ROLE_COOKIE_DAYS: i64 = 30;
pub const DEFAULT_REFRESH_COOKIE_DAYS: i64 = 7;
/// Longest accepted override, in days.
pub const MAX_COOKIE_DAYS: i64 = 3650;

/// Max-age for each mirrored cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
    pub role_max_age: Duration,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            access_max_age: Duration::days(DEFAULT_ACCESS_COOKIE_DAYS),
            refresh_max_age: Duration::days(DEFAULT_REFRESH_COOKIE_DAYS),
            role_max_age: Duration::days(DEFAULT_ROLE_COOKIE_DAYS),
        }
    }
}

impl CookiePolicy {
    /// Read `ACCESS_COOKIE_DAYS`, `REFRESH_COOKIE_DAYS` and `ROLE_COOKIE_DAYS`.
    /// Missing, unparseable or out-of-range (`1..=MAX_COOKIE_DAYS`) values
    /// keep the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a policy from an arbitrary key lookup (env, CLI flags, tests).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let days = |key: &str, default: i64| {
            lookup(key)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .filter(|days| (1..=MAX_COOKIE_DAYS).contains(days))
                .unwrap_or(default)
        };
        Self {
            access_max_age: Duration::days(days("ACCESS_COOKIE_DAYS", DEFAULT_ACCESS_COOKIE_DAYS)),
            refresh_max_age: Duration::days(days("REFRESH_COOKIE_DAYS", DEFAULT_REFRESH_COOKIE_DAYS)),
            role_max_age: Duration::days(days("ROLE_COOKIE_DAYS", DEFAULT_ROLE_COOKIE_DAYS)),
        }
    }
}
