//! `document.cookie` sink for the session repository.
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge guard on the server only sees cookies, so every session write
//! mirrors `accessToken`, `refreshToken` and `userType` here. Cookies are
//! script-set (not `HttpOnly`), `Path=/`, `SameSite=Lax`, and `Secure` when
//! the page itself is served over https.

#[cfg(test)]
#[path = "cookies_test.rs"]
mod cookies_test;

use access::CookieSink;
use access::store::StoreError;
use time::Duration;

/// Writes cookies through `document.cookie`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookies;

/// Serialize one `document.cookie` assignment.
#[cfg(any(test, feature = "hydrate"))]
fn cookie_assignment(name: &str, value: &str, max_age: Duration, secure: bool) -> String {
    let mut out = format!("{name}={value}; Path=/; Max-Age={}; SameSite=Lax", max_age.whole_seconds().max(0));
    if secure {
        out.push_str("; Secure");
    }
    out
}

#[cfg(feature = "hydrate")]
fn write_cookie(name: &str, assignment: &str) -> Result<(), StoreError> {
    use wasm_bindgen::JsCast;

    let cookie_err = |reason: String| StoreError::Cookie { name: name.to_owned(), reason };
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| cookie_err("document unavailable".to_owned()))?;
    let html = document
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| cookie_err("not an html document".to_owned()))?;
    html.set_cookie(assignment)
        .map_err(|e| cookie_err(e.as_string().unwrap_or_else(|| format!("{e:?}"))))
}

#[cfg(feature = "hydrate")]
fn page_is_https() -> bool {
    web_sys::window()
        .and_then(|w| w.location().protocol().ok())
        .is_some_and(|p| p == "https:")
}

impl CookieSink for DocumentCookies {
    fn set_cookie(&self, name: &str, value: &str, max_age: Duration) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            write_cookie(name, &cookie_assignment(name, value, max_age, page_is_https()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (name, value, max_age);
            Ok(())
        }
    }

    fn expire_cookie(&self, name: &str) -> Result<(), StoreError> {
        #[cfg(feature = "hydrate")]
        {
            write_cookie(name, &cookie_assignment(name, "", Duration::ZERO, page_is_https()))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = name;
            Ok(())
        }
    }
}
