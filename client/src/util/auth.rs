//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components apply identical redirect behavior for guard decisions
//! and for server-side session expiry.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::GuardDecision;

use crate::config::{LANDING_PATH, LOGIN_PATH};
use crate::state::session::SessionExpiry;

/// Route a redirecting guard decision resolves to.
pub fn redirect_target(decision: GuardDecision) -> Option<&'static str> {
    match decision {
        GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
        GuardDecision::RedirectToLanding => Some(LANDING_PATH),
        GuardDecision::Loading | GuardDecision::Render => None,
    }
}

/// Navigate to `/login` whenever the server rejects the active session.
pub fn install_expiry_redirect<F>(expiry: SessionExpiry, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if expiry.0.get() > 0 {
            navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
