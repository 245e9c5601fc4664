//! Fixtures shared by the crate's unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde_json::{Map, json};

use crate::api::{ApiRequest, ApiResponse};
use crate::client::{AuthClient, AuthTransport, TransportError};
use crate::config::CookiePolicy;
use crate::role::Role;
use crate::session::{Session, TokenPair, UserRecord};
use crate::store::{MemoryCookies, MemoryStorage, SessionRepository};

/// Transport that replays canned responses in order and records requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: RefCell<Vec<ApiRequest>>,
    yield_before_reply: Cell<bool>,
    in_flight: Cell<usize>,
    max_in_flight: Cell<usize>,
}

impl ScriptedTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: serde_json::Value) {
        self.responses.borrow_mut().push_back(Ok(ApiResponse::new(status, body.to_string())));
    }

    pub fn fail(&self, err: TransportError) {
        self.responses.borrow_mut().push_back(Err(err));
    }

    /// Suspend once inside every `send`, so concurrent callers interleave.
    pub fn yield_before_reply(&self) {
        self.yield_before_reply.set(true);
    }

    /// Most requests that were awaiting a reply at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.get()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.path.clone()).collect()
    }
}

#[async_trait::async_trait(?Send)]
impl AuthTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.in_flight.set(self.in_flight.get() + 1);
        self.max_in_flight.set(self.max_in_flight.get().max(self.in_flight.get()));
        if self.yield_before_reply.get() {
            YieldNow(false).await;
        }
        self.in_flight.set(self.in_flight.get() - 1);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unreachable("script exhausted".into())))
    }
}

struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

pub struct Harness {
    pub transport: Rc<ScriptedTransport>,
    pub storage: MemoryStorage,
    pub cookies: MemoryCookies,
    pub repo: Rc<SessionRepository>,
    pub client: AuthClient,
}

pub fn harness() -> Harness {
    let transport = ScriptedTransport::new();
    let storage = MemoryStorage::new();
    let cookies = MemoryCookies::new();
    let repo = Rc::new(SessionRepository::new(storage.clone(), cookies.clone(), CookiePolicy::default()));
    let client = AuthClient::new(transport.clone(), Rc::clone(&repo));
    Harness { transport, storage, cookies, repo, client }
}

pub fn user(role: Role) -> UserRecord {
    UserRecord {
        id: format!("{role}-id"),
        email: format!("{role}@example.com"),
        name: format!("{} Person", role.label()),
        role: Some(role),
        company_name: None,
        extra: Map::new(),
    }
}

pub fn session(role: Role) -> Session {
    Session::new(
        TokenPair { access_token: "acc-1".into(), refresh_token: "ref-1".into() },
        role,
        user(role),
    )
    .expect("fixture session")
}

pub fn login_body(role: Role) -> serde_json::Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": user(role),
            "userType": role,
            "tokens": {"accessToken": "acc-1", "refreshToken": "ref-1"}
        }
    })
}

pub fn refresh_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({"success": true, "data": {"tokens": {"accessToken": access, "refreshToken": refresh}}})
}

pub fn me_body(role: Role) -> serde_json::Value {
    json!({"success": true, "data": {"user": user(role)}})
}
