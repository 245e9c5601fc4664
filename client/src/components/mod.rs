//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read shared auth state from Leptos context providers.

pub mod dashboard_guard;
pub mod dashboard_shell;
