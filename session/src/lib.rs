//! Session core for the screening client.
//!
//! This crate owns the authentication session shared by the browser `client`
//! and the native `cli`: who the current user is, the bearer token that
//! proves it, durable persistence of both, and the role-gated route decision.
//! It also carries the typed REST client for the screening API, written
//! against a [`transport::Transport`] so each front-end plugs in its own HTTP
//! stack.
//!
//! SYSTEM CONTEXT
//! ==============
//! `manager` is the single writer of session state and storage keys.
//! `guard` is a pure function of a session snapshot. `client` maps endpoints
//! to typed requests; `transport` is the seam to the network.

pub mod client;
pub mod error;
pub mod guard;
pub mod manager;
pub mod models;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{ApiConfig, AuthApi, ScreeningClient};
pub use error::{ApiError, AuthError, SessionError, StoreError};
pub use guard::GuardDecision;
pub use manager::{SessionManager, SubscriptionId};
pub use store::{MemoryStore, SessionStore};
pub use types::{Identity, Role, Session, SessionStatus};
