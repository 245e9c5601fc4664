//! Session and route-authorization core shared by `server`, `client` and `cli`.
//!
//! This crate owns everything that decides *who* the current browser context
//! is and *where* it may go: the role table, backend wire types, the
//! cookie-only edge routing decision, the dual-mirror session repository, the
//! auth client with single-flight refresh, and the auth context state
//! machine. It has no browser or server dependencies; platform crates plug
//! in storage sinks and an HTTP transport through the traits defined here.

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod guard;
pub mod role;
pub mod routes;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use client::{AuthClient, AuthError, AuthTransport};
pub use context::{AuthContext, AuthState, StateWriter};
pub use role::{LOGIN_PATH, Role, dashboard_path_for};
pub use session::{Session, TokenPair, UserRecord};
pub use store::{CookieSink, KeyValueStore, SessionRepository};
