//! Auth client: the network boundary for identity operations.
//!
//! ARCHITECTURE
//! ============
//! `AuthClient` speaks the backend's auth endpoints through an injected
//! [`AuthTransport`] and is the only code that moves tokens into or out of
//! the [`SessionRepository`]. Browser (`gloo-net`), CLI (`reqwest`) and test
//! transports plug in behind the same trait.
//!
//! CONCURRENCY
//! ===========
//! Auth mutations (login, refresh, logout) take one async mutex, so at most
//! one is in flight. Refresh is additionally single-flight: callers that ask
//! for a refresh while one is running await the same shared future instead
//! of issuing a second request. Everything here is `Rc`-based and runs on a
//! single-threaded executor.
//!
//! ERROR HANDLING
//! ==============
//! Only an authorization failure (401) on an authenticated request clears the
//! local session. Network, validation and server failures are surfaced to the
//! caller unchanged.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use futures::lock::Mutex;
use serde::de::DeserializeOwned;

use crate::api::{
    ApiEnvelope, ApiRequest, ApiResponse, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, LoginData, LoginRequest, ME_ENDPOINT,
    MeData, REFRESH_ENDPOINT, RefreshData, RefreshRequest,
};
use crate::role::Role;
use crate::session::{Session, SessionError, TokenPair, UserRecord};
use crate::store::{SessionRepository, StoreError};

/// Failure to get any response at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request could not be sent: {0}")]
    Unreachable(String),
    #[error("request timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("session storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("invalid session: {0}")]
    Session(#[from] SessionError),
    #[error("session expired; sign in again")]
    ReauthRequired,
    #[error("not signed in")]
    NotAuthenticated,
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        Self::Network(err.to_string())
    }
}

impl AuthError {
    /// Map a non-2xx response to the error taxonomy.
    #[must_use]
    pub fn from_response(resp: &ApiResponse) -> Self {
        let message = resp.message().unwrap_or_else(|| format!("request failed with status {}", resp.status));
        match resp.status {
            401 => Self::Unauthorized(message),
            400..=499 => Self::Validation(message),
            _ => Self::Server(message),
        }
    }

    /// Text suitable for showing to the user. Server failures collapse to a
    /// generic message; validation messages pass through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network(_) => "Unable to reach the server. Check your connection and try again.".to_owned(),
            Self::Unauthorized(_) | Self::ReauthRequired | Self::NotAuthenticated => {
                "Your session has ended. Please sign in again.".to_owned()
            }
            Self::Server(_) | Self::Decode(_) | Self::Store(_) | Self::Session(_) => {
                "Something went wrong. Please try again later.".to_owned()
            }
        }
    }
}

/// HTTP transport to the backend.
#[async_trait::async_trait(?Send)]
pub trait AuthTransport {
    /// Send one request. Any HTTP status counts as a response; only the
    /// absence of a response is an error.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

type RefreshFlight = Shared<LocalBoxFuture<'static, Result<TokenPair, AuthError>>>;

/// Identity operations against the backend. Clones share transport,
/// repository, mutation lock and in-flight refresh.
#[derive(Clone)]
pub struct AuthClient {
    transport: Rc<dyn AuthTransport>,
    repo: Rc<SessionRepository>,
    mutation: Rc<Mutex<()>>,
    refresh_flight: Rc<RefCell<Option<RefreshFlight>>>,
}

impl AuthClient {
    pub fn new(transport: Rc<dyn AuthTransport>, repo: Rc<SessionRepository>) -> Self {
        Self { transport, repo, mutation: Rc::new(Mutex::new(())), refresh_flight: Rc::new(RefCell::new(None)) }
    }

    #[must_use]
    pub fn repository(&self) -> &SessionRepository {
        &self.repo
    }

    /// Sign in and persist the resulting session.
    ///
    /// The store is untouched on any failure. A 401 here means rejected
    /// credentials, so it is reported as [`AuthError::Validation`].
    ///
    /// # Errors
    ///
    /// Network, validation, server and decode failures, or a store failure
    /// while persisting the new session.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<Session, AuthError> {
        let _mutation = self.mutation.lock().await;
        let body = LoginRequest { email: email.trim().to_owned(), password: password.to_owned(), user_type: role };
        let body = serde_json::to_value(&body).map_err(|e| AuthError::Decode(e.to_string()))?;
        let resp = self.transport.send(ApiRequest::post(LOGIN_ENDPOINT, body)).await?;

        let envelope = decode_envelope::<LoginData>(resp).map_err(|err| match err {
            AuthError::Unauthorized(message) => AuthError::Validation(message),
            other => other,
        })?;
        let data = envelope
            .data
            .ok_or_else(|| AuthError::Decode("login response missing data".to_owned()))?;

        let session = Session::new(data.tokens, data.user_type, data.user)?;
        self.repo.write(&session)?;
        log::info!("signed in as {}", session.role);
        Ok(session)
    }

    /// Exchange `refresh_token` for a new pair and store it.
    ///
    /// Concurrent callers share one request. A rejected refresh clears the
    /// local session and yields [`AuthError::ReauthRequired`]; network and
    /// server failures leave the session in place.
    ///
    /// # Errors
    ///
    /// See above.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let flight = {
            let mut slot = self.refresh_flight.borrow_mut();
            if let Some(existing) = slot.as_ref() {
                log::debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let flight = run_refresh(
                    Rc::clone(&self.transport),
                    Rc::clone(&self.repo),
                    Rc::clone(&self.mutation),
                    refresh_token.to_owned(),
                )
                .boxed_local()
                .shared();
                *slot = Some(flight.clone());
                flight
            }
        };

        let result = flight.clone().await;

        let mut slot = self.refresh_flight.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }
        result
    }

    /// Best-effort server-side invalidation of `refresh_token`.
    ///
    /// Callers clear local state regardless of the outcome.
    ///
    /// # Errors
    ///
    /// The network or HTTP failure of the invalidation call.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let _mutation = self.mutation.lock().await;
        let Some(token) = refresh_token.filter(|t| !t.trim().is_empty()) else {
            return Ok(());
        };
        let body = serde_json::to_value(RefreshRequest { refresh_token: token.to_owned() })
            .map_err(|e| AuthError::Decode(e.to_string()))?;
        let resp = self.transport.send(ApiRequest::post(LOGOUT_ENDPOINT, body)).await?;
        decode_envelope::<serde_json::Value>(resp).map(|_| ())
    }

    /// Check `/api/auth/me` with `access_token`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] when the token is rejected; the local
    /// session is cleared then, unless a newer one was stored while the
    /// request was in flight. Other failures unchanged.
    pub async fn current_user(&self, access_token: &str) -> Result<UserRecord, AuthError> {
        let revision = self.repo.revision();
        let resp = self.transport.send(ApiRequest::get(ME_ENDPOINT).with_bearer(access_token)).await?;
        match decode_envelope::<MeData>(resp) {
            Ok(envelope) => envelope
                .data
                .map(|data| data.user)
                .ok_or_else(|| AuthError::Decode("profile response missing user".to_owned())),
            Err(err) => Err(self.on_failure(err, revision)),
        }
    }

    /// Authorized GET on a role-scoped resource endpoint.
    ///
    /// A 401 triggers one refresh and one retry. If the retry is also
    /// rejected the local session is cleared.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAuthenticated`] without a stored session,
    /// [`AuthError::ReauthRequired`] when refresh fails, otherwise the
    /// request's own failure.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, AuthError> {
        let token = self.repo.access_token().ok_or(AuthError::NotAuthenticated)?;
        let revision = self.repo.revision();
        match self.get_envelope(path, &token).await {
            Err(AuthError::Unauthorized(_)) => {
                let Some(refresh_token) = self.repo.refresh_token() else {
                    self.discard_session(revision);
                    return Err(AuthError::ReauthRequired);
                };
                let tokens = self.refresh(&refresh_token).await?;
                let revision = self.repo.revision();
                self.get_envelope(path, &tokens.access_token)
                    .await
                    .map_err(|err| self.on_failure(err, revision))
            }
            other => other,
        }
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<ApiEnvelope<T>, AuthError> {
        let resp = self.transport.send(ApiRequest::get(path).with_bearer(token)).await?;
        decode_envelope(resp)
    }

    fn on_failure(&self, err: AuthError, revision: u64) -> AuthError {
        if matches!(err, AuthError::Unauthorized(_)) {
            self.discard_session(revision);
        }
        err
    }

    /// Clear the session a rejected request was sent with. A session stored
    /// after `revision` (a login that finished meanwhile) is kept.
    fn discard_session(&self, revision: u64) {
        match self.repo.clear_if_unchanged(revision) {
            Ok(true) => log::info!("authorization rejected; cleared local session"),
            Ok(false) => {}
            Err(e) => log::warn!("failed to clear session: {e}"),
        }
    }
}

async fn run_refresh(
    transport: Rc<dyn AuthTransport>,
    repo: Rc<SessionRepository>,
    mutation: Rc<Mutex<()>>,
    refresh_token: String,
) -> Result<TokenPair, AuthError> {
    let _mutation = mutation.lock().await;
    let outcome = async {
        let body =
            serde_json::to_value(RefreshRequest { refresh_token }).map_err(|e| AuthError::Decode(e.to_string()))?;
        let resp = transport.send(ApiRequest::post(REFRESH_ENDPOINT, body)).await?;
        decode_envelope::<RefreshData>(resp)?
            .data
            .map(RefreshData::into_tokens)
            .ok_or_else(|| AuthError::Decode("refresh response missing tokens".to_owned()))
    }
    .await;

    match outcome {
        Ok(tokens) => {
            repo.update_tokens(&tokens)?;
            log::debug!("access token refreshed");
            Ok(tokens)
        }
        Err(AuthError::Unauthorized(reason) | AuthError::Validation(reason)) => {
            log::info!("refresh rejected: {reason}");
            if let Err(e) = repo.clear() {
                log::warn!("failed to clear session: {e}");
            }
            Err(AuthError::ReauthRequired)
        }
        Err(other) => Err(other),
    }
}

/// Check status and `success`, then decode the envelope.
fn decode_envelope<T: DeserializeOwned>(resp: ApiResponse) -> Result<ApiEnvelope<T>, AuthError> {
    if !resp.is_success() {
        return Err(AuthError::from_response(&resp));
    }
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(&resp.body).map_err(|e| AuthError::Decode(e.to_string()))?;
    if !envelope.success {
        let message = envelope.message.unwrap_or_else(|| "request was rejected".to_owned());
        return Err(AuthError::Validation(message));
    }
    Ok(envelope)
}
