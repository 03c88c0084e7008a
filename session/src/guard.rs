//! Route guard decision table.
//!
//! Pure function of a session snapshot and an optional required role. The
//! UI re-evaluates it on every render; it keeps no state of its own.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::types::{Role, Session};

/// What a protected route should do with the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Restore has not finished; show only a loading indicator.
    Loading,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in, but with the wrong role for this route.
    RedirectToLanding,
    /// Render the protected content.
    Render,
}

/// Decide how a route guarded by `required` handles `session`.
#[must_use]
pub fn evaluate(session: &Session, required: Option<Role>) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Loading;
    }
    let Some(role) = session.role() else {
        return GuardDecision::RedirectToLogin;
    };
    match required {
        Some(required) if required != role => GuardDecision::RedirectToLanding,
        _ => GuardDecision::Render,
    }
}
