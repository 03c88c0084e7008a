//! Reactive bridge between the session manager and Leptos.
//!
//! SYSTEM CONTEXT
//! ==============
//! The manager is framework-agnostic and notifies plain callbacks. This
//! module mirrors every transition into an `RwSignal<Session>` that route
//! guards and identity-aware components read, and turns the manager's
//! unauthorized callback into a counter that the router observes.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use leptos::prelude::*;
use session::{AuthApi, ScreeningClient, Session, SessionManager, SessionStore};

use crate::net::transport::GlooTransport;
use crate::util::storage::LocalStorageStore;

/// The manager as the browser app wires it.
pub type AppSession = SessionManager<LocalStorageStore, ScreeningClient<GlooTransport>>;

/// Bumped each time the server rejects the active session.
#[derive(Clone, Copy, Debug)]
pub struct SessionExpiry(pub RwSignal<u64>);

/// Mirror `manager` into `session` and count unauthorized sign-outs in `expiry`.
pub fn bridge<S, A>(manager: &SessionManager<S, A>, session: RwSignal<Session>, expiry: SessionExpiry)
where
    S: SessionStore,
    A: AuthApi,
{
    manager.subscribe(move |next| session.set(next.clone()));
    manager.on_unauthorized(move || expiry.0.update(|count| *count += 1));
}

/// Build the app's manager, provide it and its signals as context, and
/// restore the persisted session. Torn down with the calling owner.
pub fn install(config: session::ApiConfig) -> AppSession {
    let manager = AppSession::new(LocalStorageStore, ScreeningClient::new(GlooTransport, config));
    let session = RwSignal::new(manager.snapshot());
    let expiry = SessionExpiry(RwSignal::new(0));
    bridge(&manager, session, expiry);

    provide_context(manager.clone());
    provide_context(session);
    provide_context(expiry);

    manager.init();

    let owned = manager.clone();
    on_cleanup(move || owned.teardown());
    manager
}
