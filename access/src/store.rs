//! Token store: one session, two mirrors.
//!
//! ARCHITECTURE
//! ============
//! [`SessionRepository`] is the only writer of persisted session state. Each
//! `write`/`clear` fans out to a persistent key/value store (browser
//! `localStorage`, a JSON file in the CLI) and a cookie sink that the edge
//! guard can read. `read` consults the persistent store only; cookies exist
//! for the edge guard.
//!
//! TRADE-OFFS
//! ==========
//! There is no partial-write recovery. If the cookie write fails after the
//! storage write succeeded, the mirrors disagree until the next `write` or
//! `clear`. Both sinks are synchronous, so a completed call is visible to the
//! next guard evaluation.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use time::Duration;

use crate::config::CookiePolicy;
use crate::role::Role;
use crate::session::{Session, TokenPair, UserRecord};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_TYPE_KEY: &str = "userType";
pub const USER_KEY: &str = "user";

/// Every persistent-store key, in write order.
pub const STORAGE_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_TYPE_KEY, USER_KEY];
/// Every mirrored cookie.
pub const COOKIE_NAMES: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_TYPE_KEY];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage write failed for `{key}`: {reason}")]
    Storage { key: String, reason: String },
    #[error("cookie write failed for `{name}`: {reason}")]
    Cookie { name: String, reason: String },
    #[error("user record could not be serialized: {0}")]
    Serialize(String),
}

/// Persistent string store (`localStorage`-shaped).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the backing store rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] when the backing store is unusable.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Cookie jar visible to the edge guard.
pub trait CookieSink {
    /// Set `name=value` with `path=/` and the given max-age.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Cookie`] when the cookie cannot be written.
    fn set_cookie(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError>;

    /// Expire `name` immediately. Expiring an absent cookie succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Cookie`] when the cookie cannot be written.
    fn expire_cookie(&self, name: &str) -> Result<(), StoreError>;
}

// =============================================================================
// IN-MEMORY SINKS
// =============================================================================

/// Map-backed store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Map-backed cookie jar that remembers each cookie's max-age. Clones share
/// the same jar.
#[derive(Clone, Debug, Default)]
pub struct MemoryCookies {
    jar: Rc<RefCell<HashMap<String, (String, Duration)>>>,
}

impl MemoryCookies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<String> {
        self.jar.borrow().get(name).map(|(value, _)| value.clone())
    }

    #[must_use]
    pub fn max_age(&self, name: &str) -> Option<Duration> {
        self.jar.borrow().get(name).map(|(_, age)| *age)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jar.borrow().is_empty()
    }

    /// Render live cookies as a `Cookie:` request header value, sorted by name.
    #[must_use]
    pub fn header(&self) -> String {
        let jar = self.jar.borrow();
        let mut pairs: Vec<String> = jar.iter().map(|(name, (value, _))| format!("{name}={value}")).collect();
        pairs.sort();
        pairs.join("; ")
    }
}

impl CookieSink for MemoryCookies {
    fn set_cookie(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError> {
        if max_age <= Duration::ZERO {
            self.jar.borrow_mut().remove(name);
        } else {
            self.jar.borrow_mut().insert(name.to_owned(), (value.to_owned(), max_age));
        }
        Ok(())
    }

    fn expire_cookie(&self, name: &str) -> Result<(), StoreError> {
        self.jar.borrow_mut().remove(name);
        Ok(())
    }
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// Single read/write/clear contract over both mirrors.
pub struct SessionRepository {
    storage: Box<dyn KeyValueStore>,
    cookies: Box<dyn CookieSink>,
    policy: CookiePolicy,
    revision: Cell<u64>,
}

impl SessionRepository {
    pub fn new(storage: impl KeyValueStore + 'static, cookies: impl CookieSink + 'static, policy: CookiePolicy) -> Self {
        Self { storage: Box::new(storage), cookies: Box::new(cookies), policy, revision: Cell::new(0) }
    }

    /// Repository over fresh in-memory sinks.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), MemoryCookies::new(), CookiePolicy::default())
    }

    /// Bumped by every `write` and `update_tokens`; `clear` leaves it alone.
    /// A request that captured the revision may only clear the session it
    /// was sent with.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Clear, unless a session was written after `revision` was captured.
    /// Returns whether the session was cleared.
    ///
    /// # Errors
    ///
    /// See [`Self::clear`].
    pub fn clear_if_unchanged(&self, revision: u64) -> Result<bool, StoreError> {
        if self.revision.get() != revision {
            log::debug!("session replaced since revision {revision}; keeping it");
            return Ok(false);
        }
        self.clear().map(|()| true)
    }

    /// Persist `session` to both mirrors.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure; earlier writes are not rolled back.
    pub fn write(&self, session: &Session) -> Result<(), StoreError> {
        self.bump();
        let user = serde_json::to_string(&session.user).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let role = session.role.as_str();

        self.storage.set(ACCESS_TOKEN_KEY, &session.tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.tokens.refresh_token)?;
        self.storage.set(USER_TYPE_KEY, role)?;
        self.storage.set(USER_KEY, &user)?;

        self.cookies
            .set_cookie(ACCESS_TOKEN_KEY, &session.tokens.access_token, self.policy.access_max_age)?;
        self.cookies
            .set_cookie(REFRESH_TOKEN_KEY, &session.tokens.refresh_token, self.policy.refresh_max_age)?;
        self.cookies.set_cookie(USER_TYPE_KEY, role, self.policy.role_max_age)?;

        log::debug!("session written for role {role}");
        Ok(())
    }

    /// Replace both tokens in both mirrors; role and user stay as stored.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure.
    pub fn update_tokens(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.bump();
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;
        self.cookies
            .set_cookie(ACCESS_TOKEN_KEY, &tokens.access_token, self.policy.access_max_age)?;
        self.cookies
            .set_cookie(REFRESH_TOKEN_KEY, &tokens.refresh_token, self.policy.refresh_max_age)?;
        Ok(())
    }

    fn bump(&self) {
        self.revision.set(self.revision.get().wrapping_add(1));
    }

    /// Session as seen by the persistent store, or `None` when anonymous or
    /// when the stored fields are inconsistent.
    #[must_use]
    pub fn read(&self) -> Option<Session> {
        let access_token = self.access_token()?;
        let refresh_token = self.storage.get(REFRESH_TOKEN_KEY).unwrap_or_default();
        let role = self.storage.get(USER_TYPE_KEY).as_deref().and_then(Role::parse)?;
        let raw_user = self.storage.get(USER_KEY)?;
        let user: UserRecord = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("stored user record unreadable: {e}");
                return None;
            }
        };
        match Session::new(TokenPair { access_token, refresh_token }, role, user) {
            Ok(session) => Some(session),
            Err(e) => {
                log::warn!("stored session rejected: {e}");
                None
            }
        }
    }

    /// Stored access token, if non-empty.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Stored refresh token, if non-empty.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Remove every key and expire every cookie. Idempotent; every removal is
    /// attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure after all removals were attempted.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut first_err = None;
        for key in STORAGE_KEYS {
            if let Err(e) = self.storage.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        for name in COOKIE_NAMES {
            if let Err(e) = self.cookies.expire_cookie(name) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => {
                log::warn!("session clear incomplete: {e}");
                Err(e)
            }
            None => Ok(()),
        }
    }
}
