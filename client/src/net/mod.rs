//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` carries auth-client requests over browser `fetch`; everything
//! above the wire (envelopes, status classification, refresh) lives in the
//! `access` crate.

pub mod transport;
