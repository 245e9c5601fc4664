use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::api::Method;
use crate::store::{ACCESS_TOKEN_KEY, KeyValueStore, USER_TYPE_KEY};
use crate::test_helpers::{harness, login_body, me_body, refresh_body, session, user};

// =============================================================================
// error taxonomy
// =============================================================================

#[test]
fn from_response_classifies_statuses() {
    let body = r#"{"success":false,"message":"nope"}"#;
    assert_eq!(AuthError::from_response(&ApiResponse::new(401, body)), AuthError::Unauthorized("nope".into()));
    assert_eq!(AuthError::from_response(&ApiResponse::new(422, body)), AuthError::Validation("nope".into()));
    assert_eq!(AuthError::from_response(&ApiResponse::new(503, body)), AuthError::Server("nope".into()));
}

#[test]
fn from_response_without_message_names_status() {
    let err = AuthError::from_response(&ApiResponse::new(500, ""));
    assert_eq!(err, AuthError::Server("request failed with status 500".into()));
}

#[test]
fn user_message_passes_validation_text_and_hides_server_detail() {
    assert_eq!(AuthError::Validation("Invalid password".into()).user_message(), "Invalid password");
    assert!(!AuthError::Server("stack trace".into()).user_message().contains("stack"));
}

// =============================================================================
// login
// =============================================================================

#[test]
fn login_success_writes_both_mirrors() {
    let h = harness();
    h.transport.reply(200, login_body(Role::Employer));

    let session = block_on(h.client.login("hr@acme.io", "pw", Role::Employer)).unwrap();

    assert_eq!(session.role, Role::Employer);
    assert_eq!(h.repo.read(), Some(session));
    assert_eq!(h.cookies.value(USER_TYPE_KEY).as_deref(), Some("employer"));
    let sent = &h.transport.requests()[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.path, LOGIN_ENDPOINT);
    assert_eq!(sent.body.as_ref().unwrap()["userType"], "employer");
}

#[test]
fn login_rejection_returns_backend_message_and_leaves_store_alone() {
    let h = harness();
    h.transport.reply(200, json!({"success": false, "message": "Account suspended"}));

    let err = block_on(h.client.login("a@b.io", "pw", Role::User)).unwrap_err();

    assert_eq!(err, AuthError::Validation("Account suspended".into()));
    assert!(h.storage.is_empty());
    assert!(h.cookies.is_empty());
}

#[test]
fn login_bad_credentials_401_is_validation() {
    let h = harness();
    h.transport.reply(401, json!({"success": false, "message": "Invalid credentials"}));
    let err = block_on(h.client.login("a@b.io", "bad", Role::Admin)).unwrap_err();
    assert_eq!(err, AuthError::Validation("Invalid credentials".into()));
}

#[test]
fn login_keeps_existing_session_on_failure() {
    let h = harness();
    h.repo.write(&session(Role::Admin)).unwrap();
    h.transport.reply(500, json!({"success": false, "message": "db down"}));

    let err = block_on(h.client.login("a@b.io", "pw", Role::Admin)).unwrap_err();

    assert!(matches!(err, AuthError::Server(_)));
    assert_eq!(h.repo.read(), Some(session(Role::Admin)));
}

#[test]
fn login_network_failure_is_network_error() {
    let h = harness();
    h.transport.fail(TransportError::Timeout);
    let err = block_on(h.client.login("a@b.io", "pw", Role::User)).unwrap_err();
    assert_eq!(err, AuthError::Network("request timed out".into()));
}

#[test]
fn login_with_disagreeing_roles_is_rejected() {
    let h = harness();
    let mut body = login_body(Role::Employer);
    body["data"]["user"]["role"] = json!("admin");
    h.transport.reply(200, body);

    let err = block_on(h.client.login("a@b.io", "pw", Role::Employer)).unwrap_err();

    assert!(matches!(err, AuthError::Session(_)));
    assert!(h.storage.is_empty());
}

// =============================================================================
// refresh
// =============================================================================

#[test]
fn refresh_replaces_tokens_only() {
    let h = harness();
    h.repo.write(&session(Role::User)).unwrap();
    h.transport.reply(200, refresh_body("acc-2", "ref-2"));

    let tokens = block_on(h.client.refresh("ref-1")).unwrap();

    assert_eq!(tokens.access_token, "acc-2");
    let stored = h.repo.read().unwrap();
    assert_eq!(stored.tokens, tokens);
    assert_eq!(stored.user, user(Role::User));
    assert_eq!(h.cookies.value(ACCESS_TOKEN_KEY).as_deref(), Some("acc-2"));
    assert_eq!(h.transport.requests()[0].body.as_ref().unwrap()["refreshToken"], "ref-1");
}

#[test]
fn rejected_refresh_clears_and_requires_reauth() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.reply(401, json!({"success": false, "message": "refresh token expired"}));

    let err = block_on(h.client.refresh("ref-1")).unwrap_err();

    assert_eq!(err, AuthError::ReauthRequired);
    assert_eq!(h.repo.read(), None);
    assert!(h.cookies.is_empty());
}

#[test]
fn refresh_network_failure_keeps_session() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.fail(TransportError::Unreachable("offline".into()));

    let err = block_on(h.client.refresh("ref-1")).unwrap_err();

    assert!(matches!(err, AuthError::Network(_)));
    assert!(h.repo.read().is_some());
}

#[test]
fn concurrent_refreshes_share_one_request() {
    let h = harness();
    h.repo.write(&session(Role::Admin)).unwrap();
    h.transport.yield_before_reply();
    h.transport.reply(200, refresh_body("acc-2", "ref-2"));

    let (a, b) = block_on(async { futures::join!(h.client.refresh("ref-1"), h.client.refresh("ref-1")) });

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(h.transport.paths(), vec![REFRESH_ENDPOINT.to_owned()]);
}

#[test]
fn concurrent_logins_run_one_at_a_time() {
    let h = harness();
    h.transport.yield_before_reply();
    h.transport.reply(200, login_body(Role::Employer));
    h.transport.reply(200, login_body(Role::Admin));

    let (first, second) = block_on(async {
        futures::join!(
            h.client.login("hr@acme.io", "pw", Role::Employer),
            h.client.login("root@acme.io", "pw", Role::Admin)
        )
    });

    assert_eq!(first.unwrap().role, Role::Employer);
    assert_eq!(second.unwrap().role, Role::Admin);
    assert_eq!(h.transport.max_in_flight(), 1);
    assert_eq!(h.repo.read().map(|s| s.role), Some(Role::Admin));
}

#[test]
fn logout_waits_for_in_flight_login() {
    let h = harness();
    h.transport.yield_before_reply();
    h.transport.reply(200, login_body(Role::User));
    h.transport.reply(200, json!({"success": true}));

    let (login, logout) = block_on(async {
        futures::join!(h.client.login("kid@uni.edu", "pw", Role::User), h.client.logout(Some("ref-1")))
    });

    login.unwrap();
    logout.unwrap();
    assert_eq!(h.transport.max_in_flight(), 1);
    assert_eq!(h.transport.paths(), vec![LOGIN_ENDPOINT.to_owned(), LOGOUT_ENDPOINT.to_owned()]);
}

#[test]
fn sequential_refreshes_each_hit_the_backend() {
    let h = harness();
    h.repo.write(&session(Role::Admin)).unwrap();
    h.transport.reply(200, refresh_body("acc-2", "ref-2"));
    h.transport.reply(200, refresh_body("acc-3", "ref-3"));

    block_on(h.client.refresh("ref-1")).unwrap();
    let second = block_on(h.client.refresh("ref-2")).unwrap();

    assert_eq!(second.access_token, "acc-3");
    assert_eq!(h.transport.requests().len(), 2);
}

// =============================================================================
// logout
// =============================================================================

#[test]
fn logout_posts_refresh_token() {
    let h = harness();
    h.transport.reply(200, json!({"success": true}));
    block_on(h.client.logout(Some("ref-1"))).unwrap();
    let sent = &h.transport.requests()[0];
    assert_eq!(sent.path, LOGOUT_ENDPOINT);
    assert_eq!(sent.body.as_ref().unwrap()["refreshToken"], "ref-1");
}

#[test]
fn logout_without_token_skips_network() {
    let h = harness();
    block_on(h.client.logout(None)).unwrap();
    assert!(h.transport.requests().is_empty());
}

#[test]
fn logout_reports_network_failure_without_touching_store() {
    let h = harness();
    h.repo.write(&session(Role::User)).unwrap();
    h.transport.fail(TransportError::Timeout);
    assert!(block_on(h.client.logout(Some("ref-1"))).is_err());
    assert!(h.repo.read().is_some());
}

// =============================================================================
// current_user
// =============================================================================

#[test]
fn current_user_sends_bearer_and_returns_record() {
    let h = harness();
    h.transport.reply(200, me_body(Role::Employer));
    let user_record = block_on(h.client.current_user("acc-1")).unwrap();
    assert_eq!(user_record, user(Role::Employer));
    assert_eq!(h.transport.requests()[0].bearer.as_deref(), Some("acc-1"));
}

#[test]
fn current_user_401_clears_session() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.reply(401, json!({"success": false, "message": "jwt expired"}));

    let err = block_on(h.client.current_user("acc-1")).unwrap_err();

    assert_eq!(err, AuthError::Unauthorized("jwt expired".into()));
    assert_eq!(h.repo.read(), None);
}

#[test]
fn current_user_server_error_keeps_session() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.reply(502, json!({}));
    assert!(matches!(block_on(h.client.current_user("acc-1")), Err(AuthError::Server(_))));
    assert!(h.repo.read().is_some());
}

// =============================================================================
// fetch
// =============================================================================

#[test]
fn fetch_without_session_is_not_authenticated() {
    let h = harness();
    let result = block_on(h.client.fetch::<serde_json::Value>("/api/admin/stats"));
    assert_eq!(result.unwrap_err(), AuthError::NotAuthenticated);
    assert!(h.transport.requests().is_empty());
}

#[test]
fn fetch_returns_envelope_with_paging() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.reply(200, json!({"success": true, "data": [{"id": 1}], "total": 9, "page": 1, "pages": 9}));

    let env = block_on(h.client.fetch::<Vec<serde_json::Value>>("/api/employers/jobs")).unwrap();

    assert_eq!(env.data.unwrap().len(), 1);
    assert_eq!(env.total, Some(9));
    assert_eq!(h.transport.requests()[0].bearer.as_deref(), Some("acc-1"));
}

#[test]
fn fetch_refreshes_once_on_401_and_retries() {
    let h = harness();
    h.repo.write(&session(Role::Admin)).unwrap();
    h.transport.reply(401, json!({"success": false, "message": "jwt expired"}));
    h.transport.reply(200, refresh_body("acc-2", "ref-2"));
    h.transport.reply(200, json!({"success": true, "data": {"users": 3}}));

    let env = block_on(h.client.fetch::<serde_json::Value>("/api/admin/stats")).unwrap();

    assert_eq!(env.data.unwrap()["users"], 3);
    assert_eq!(h.transport.paths(), vec!["/api/admin/stats", REFRESH_ENDPOINT, "/api/admin/stats"]);
    assert_eq!(h.transport.requests()[2].bearer.as_deref(), Some("acc-2"));
}

#[test]
fn fetch_clears_when_retry_is_still_unauthorized() {
    let h = harness();
    h.repo.write(&session(Role::Admin)).unwrap();
    h.transport.reply(401, json!({"message": "jwt expired"}));
    h.transport.reply(200, refresh_body("acc-2", "ref-2"));
    h.transport.reply(401, json!({"message": "revoked"}));

    let err = block_on(h.client.fetch::<serde_json::Value>("/api/admin/stats")).unwrap_err();

    assert_eq!(err, AuthError::Unauthorized("revoked".into()));
    assert_eq!(h.repo.read(), None);
}

#[test]
fn fetch_with_failed_refresh_requires_reauth() {
    let h = harness();
    h.repo.write(&session(Role::User)).unwrap();
    h.transport.reply(401, json!({"message": "jwt expired"}));
    h.transport.reply(400, json!({"message": "invalid refresh token"}));

    let err = block_on(h.client.fetch::<serde_json::Value>("/api/gig-applications")).unwrap_err();

    assert_eq!(err, AuthError::ReauthRequired);
    assert!(h.storage.get(ACCESS_TOKEN_KEY).is_none());
}

#[test]
fn fetch_validation_error_keeps_session() {
    let h = harness();
    h.repo.write(&session(Role::Employer)).unwrap();
    h.transport.reply(404, json!({"success": false, "message": "Job not found"}));

    let err = block_on(h.client.fetch::<serde_json::Value>("/api/employers/jobs/9")).unwrap_err();

    assert_eq!(err, AuthError::Validation("Job not found".into()));
    assert!(h.repo.read().is_some());
}
