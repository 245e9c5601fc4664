//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates guarding and
//! chrome to `components`.

pub mod auth_flow;
pub mod dashboard;
pub mod landing;
pub mod login;
