//! Networking for the screening API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves bytes with `gloo-net`; `api` runs typed calls through
//! the session manager so a rejected token signs the user out.

pub mod api;
pub mod transport;
