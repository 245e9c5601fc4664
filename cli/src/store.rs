//! File-backed session mirrors for `gigctl`.
//!
//! DESIGN
//! ======
//! One JSON file holds both mirrors the browser keeps separately: the
//! persistent key/value entries and the cookie jar (value plus absolute
//! expiry). [`FileStore`] and [`FileCookies`] are two views over the same
//! [`SessionFile`], and every mutation rewrites the file, so a `write` or
//! `clear` is on disk before the command returns.
//!
//! Expired cookies read as absent, which lets `gigctl route` reproduce what
//! the edge guard would see.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use access::config::CookiePolicy;
use access::store::StoreError;
use access::{CookieSink, KeyValueStore, SessionRepository};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub value: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Contents {
    #[serde(default)]
    storage: BTreeMap<String, String>,
    #[serde(default)]
    cookies: BTreeMap<String, StoredCookie>,
}

/// Shared handle to the on-disk session document.
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: Rc<PathBuf>,
    contents: Rc<RefCell<Contents>>,
}

impl SessionFile {
    /// Load `path`, or start empty if it does not exist yet. An unreadable
    /// or corrupt file also starts empty; the next write replaces it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let contents = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "session file unreadable; starting empty");
                Contents::default()
            }),
            Err(_) => Contents::default(),
        };
        Self { path: Rc::new(path), contents: Rc::new(RefCell::new(contents)) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Live cookie value, `None` when missing or expired.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookie_at(name, OffsetDateTime::now_utc())
    }

    fn cookie_at(&self, name: &str, now: OffsetDateTime) -> Option<String> {
        let contents = self.contents.borrow();
        let cookie = contents.cookies.get(name)?;
        (cookie.expires_at > now.unix_timestamp() && !cookie.value.is_empty()).then(|| cookie.value.clone())
    }

    /// Repository over this file with `policy` applied to cookie writes.
    #[must_use]
    pub fn repository(&self, policy: CookiePolicy) -> SessionRepository {
        SessionRepository::new(FileStore(self.clone()), FileCookies(self.clone()), policy)
    }

    fn mutate(&self, what: &str, change: impl FnOnce(&mut Contents)) -> Result<(), StoreError> {
        change(&mut self.contents.borrow_mut());
        self.flush().map_err(|reason| StoreError::Storage { key: what.to_owned(), reason })
    }

    fn flush(&self) -> Result<(), String> {
        let raw = serde_json::to_string_pretty(&*self.contents.borrow()).map_err(|e| e.to_string())?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| format!("{}: {e}", dir.display()))?;
        }
        std::fs::write(&**self.path, raw).map_err(|e| format!("{}: {e}", self.path.display()))
    }
}

/// Persistent mirror view.
pub struct FileStore(pub SessionFile);

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.contents.borrow().storage.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.mutate(key, |c| {
            c.storage.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.0.contents.borrow().storage.contains_key(key) {
            return Ok(());
        }
        self.0.mutate(key, |c| {
            c.storage.remove(key);
        })
    }
}

/// Cookie mirror view.
pub struct FileCookies(pub SessionFile);

impl CookieSink for FileCookies {
    fn set_cookie(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError> {
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(max_age)
            .ok_or_else(|| StoreError::Cookie {
                name: name.to_owned(),
                reason: format!("max-age {max_age} out of range"),
            })?
            .unix_timestamp();
        self.0
            .mutate(name, |c| {
                c.cookies.insert(name.to_owned(), StoredCookie { value: value.to_owned(), expires_at });
            })
            .map_err(|e| cookie_error(name, e))
    }

    fn expire_cookie(&self, name: &str) -> Result<(), StoreError> {
        if !self.0.contents.borrow().cookies.contains_key(name) {
            return Ok(());
        }
        self.0
            .mutate(name, |c| {
                c.cookies.remove(name);
            })
            .map_err(|e| cookie_error(name, e))
    }
}

fn cookie_error(name: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::Storage { reason, .. } => StoreError::Cookie { name: name.to_owned(), reason },
        other => other,
    }
}
