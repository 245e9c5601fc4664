//! Auth context: the reactive "who am I" state for client-rendered views.
//!
//! DESIGN
//! ======
//! [`AuthContext`] is the single writer of [`AuthState`]. The UI provides a
//! [`StateWriter`] (a Leptos signal in the browser) and reads it back
//! reactively; nothing else mutates the state. Transitions are
//! last-write-wins. `is_loading` is true only between `mount` and the end of
//! the first `validate`.
//!
//! Async completions check whether the owning view is still attached; after
//! [`AuthContext::detach`] results are dropped instead of written.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::client::{AuthClient, AuthError};
use crate::role::{LOGIN_PATH, Role};
use crate::routes::post_login_target;
use crate::session::{Session, UserRecord};

/// Session state exposed to the render tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserRecord>,
    pub role: Option<Role>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    /// Initial state before the token store has been consulted.
    #[must_use]
    pub fn loading() -> Self {
        Self { is_loading: true, ..Self::default() }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(session: &Session) -> Self {
        Self { user: Some(session.user.clone()), role: Some(session.role), is_authenticated: true, is_loading: false }
    }

    /// Display name for headers and greetings.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user.as_ref().map(UserRecord::display_name)
    }
}

/// Sink for state transitions.
pub trait StateWriter {
    fn get(&self) -> AuthState;
    fn set(&self, state: AuthState);
}

impl StateWriter for Rc<RefCell<AuthState>> {
    fn get(&self) -> AuthState {
        self.borrow().clone()
    }

    fn set(&self, state: AuthState) {
        *self.borrow_mut() = state;
    }
}

/// Owns session state transitions for one UI tree.
#[derive(Clone)]
pub struct AuthContext<W: StateWriter> {
    client: AuthClient,
    state: W,
    attached: Rc<Cell<bool>>,
}

impl<W: StateWriter> AuthContext<W> {
    pub fn new(client: AuthClient, state: W) -> Self {
        Self { client, state, attached: Rc::new(Cell::new(true)) }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    /// Synchronously seed state from the token store.
    ///
    /// With a stored session the state is optimistically authenticated and
    /// still loading; returns `true` when [`Self::validate`] should follow.
    pub fn mount(&self) -> bool {
        match self.client.repository().read() {
            Some(session) => {
                log::debug!("restored {} session from storage", session.role);
                self.state.set(AuthState { is_loading: true, ..AuthState::signed_in(&session) });
                true
            }
            None => {
                self.state.set(AuthState::anonymous());
                false
            }
        }
    }

    /// Confirm the stored session with the backend.
    ///
    /// A 401 clears the session and flips to anonymous. Other failures keep
    /// the optimistic state. Loading ends either way. If a login or refresh
    /// stored a session while the check was in flight, its outcome
    /// is discarded.
    pub async fn validate(&self) {
        let repo = self.client.repository();
        let Some(token) = repo.access_token() else {
            self.apply(AuthState::anonymous());
            return;
        };
        let revision = repo.revision();

        let result = self.client.current_user(&token).await;
        let current = self.state.get();
        if repo.revision() != revision {
            log::debug!("session replaced during validation; ignoring result");
            self.apply(AuthState { is_loading: false, ..current });
            return;
        }
        let next = match result {
            Ok(user) => match (current.role, user.role) {
                (Some(role), Some(user_role)) if role != user_role => {
                    log::warn!("profile role {user_role} disagrees with session role {role}");
                    current
                }
                _ => AuthState { user: Some(user), ..current },
            },
            Err(AuthError::Unauthorized(reason)) => {
                log::info!("stored session rejected: {reason}");
                AuthState::anonymous()
            }
            Err(err) => {
                log::warn!("session validation failed, keeping stored session: {err}");
                current
            }
        };
        self.apply(AuthState { is_loading: false, ..next });
    }

    /// Sign in and publish the new session. Returns the path to navigate to,
    /// honouring `redirect` when the role may open it.
    ///
    /// # Errors
    ///
    /// Whatever [`AuthClient::login`] reports; state is unchanged then.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
        redirect: Option<&str>,
    ) -> Result<String, AuthError> {
        let session = self.client.login(email, password, role).await?;
        self.apply(AuthState::signed_in(&session));
        Ok(post_login_target(session.role, redirect))
    }

    /// Sign out. Local state is always cleared, whatever the network does;
    /// returns the login path.
    pub async fn logout(&self) -> &'static str {
        let refresh_token = self.client.repository().refresh_token();
        if let Err(e) = self.client.logout(refresh_token.as_deref()).await {
            log::warn!("server-side logout failed, clearing locally: {e}");
        }
        if let Err(e) = self.client.repository().clear() {
            log::warn!("failed to clear session: {e}");
        }
        self.apply(AuthState::anonymous());
        LOGIN_PATH
    }

    /// Stop publishing results; call when the owning view unmounts.
    pub fn detach(&self) {
        self.attached.set(false);
    }

    fn apply(&self, state: AuthState) {
        if self.attached.get() {
            self.state.set(state);
        } else {
            log::debug!("auth context detached; dropping state update");
        }
    }
}
