//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (`localStorage`,
//! `document.cookie`) from page and component logic.

pub mod cookies;
pub mod storage;
