//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`provide_auth`] runs once at the app root. It provides two context
//! values: the read side, `RwSignal<AuthState>`, used by the dashboard guard
//! and identity-aware components; and the write side, [`AuthHandle`], used by
//! the login form and logout buttons. Only the handle's `AuthContext` ever
//! writes the signal.
//!
//! DESIGN
//! ======
//! The context is built on browser sinks (`localStorage`, `document.cookie`,
//! `fetch`). Restoring the stored session happens in an effect, so it runs
//! after hydration and never on the server; SSR output always renders the
//! loading state. Unmounting the root detaches the context so late network
//! results are dropped.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::rc::Rc;

use access::config::CookiePolicy;
use access::{AuthClient, AuthContext, AuthState, SessionRepository, StateWriter};
use leptos::prelude::*;

use crate::net::transport::BrowserTransport;
use crate::util::cookies::DocumentCookies;
use crate::util::storage::LocalStore;

/// Writes auth transitions into the shared signal.
#[derive(Clone, Copy)]
pub struct SignalWriter(pub RwSignal<AuthState>);

impl StateWriter for SignalWriter {
    fn get(&self) -> AuthState {
        self.0.get_untracked()
    }

    fn set(&self, state: AuthState) {
        self.0.set(state);
    }
}

pub type BrowserAuthContext = AuthContext<SignalWriter>;

/// Copyable handle to the auth context; the context itself is not `Send`.
pub type AuthHandle = StoredValue<BrowserAuthContext, LocalStorage>;

/// Session repository over `localStorage` and `document.cookie`.
#[must_use]
pub fn browser_repository() -> SessionRepository {
    SessionRepository::new(LocalStore, DocumentCookies, CookiePolicy::default())
}

/// Auth context over browser sinks writing into `state`.
#[must_use]
pub fn browser_context(state: RwSignal<AuthState>) -> BrowserAuthContext {
    let client = AuthClient::new(Rc::new(BrowserTransport), Rc::new(browser_repository()));
    AuthContext::new(client, SignalWriter(state))
}

/// Create the auth signal and context, provide both, and restore any stored
/// session once the app is live in the browser.
pub fn provide_auth() -> (RwSignal<AuthState>, AuthHandle) {
    let state = RwSignal::new(AuthState::loading());
    let handle: AuthHandle = StoredValue::new_local(browser_context(state));
    provide_context(state);
    provide_context(handle);

    Effect::new(move || {
        let ctx = handle.get_value();
        if ctx.mount() {
            #[cfg(feature = "hydrate")]
            leptos::task::spawn_local(async move { ctx.validate().await });
        }
    });
    on_cleanup(move || handle.with_value(BrowserAuthContext::detach));

    (state, handle)
}

/// Sign out, then leave for the login page with a full navigation so the
/// edge guard sees the cleared cookies.
pub fn sign_out(handle: AuthHandle) {
    #[cfg(feature = "hydrate")]
    {
        let ctx = handle.get_value();
        leptos::task::spawn_local(async move {
            let target = ctx.logout().await;
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(target);
            }
        });
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = handle;
    }
}

/// Header label for the signed-in user, e.g. `"Ada Lovelace · Employer"`.
#[must_use]
pub fn identity_label(state: &AuthState) -> Option<String> {
    let name = state.display_name()?;
    Some(match state.role {
        Some(role) => format!("{name} · {}", role.label()),
        None => name.to_owned(),
    })
}
