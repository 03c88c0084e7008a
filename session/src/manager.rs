//! Session manager: the single owner of authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each front-end constructs one manager at startup and hands clones of it to
//! whatever needs identity facts (Leptos context in the browser, command
//! handlers in the CLI). It is the only writer of the persisted token and
//! identity keys.
//!
//! LIFECYCLE
//! =========
//! `new` → `Loading`; `init` restores from storage → `Resolved`;
//! `establish` / `clear` move between signed in and signed out; `teardown`
//! detaches subscribers and abandons in-flight sign-ins.
//!
//! CONCURRENCY
//! ===========
//! Every sign-in attempt takes a generation ticket. `clear`,
//! `cancel_pending` and newer attempts bump the generation, and a response
//! arriving with a stale ticket is dropped, so the last attempt started wins.
//! Storage writes and the in-memory swap happen under one lock; listeners
//! run after the lock is released.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::AuthApi;
use crate::error::{ApiError, SessionError};
use crate::store::{self, SessionStore};
use crate::types::{Credentials, Identity, Registration, Role, Session};

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;
type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`SessionManager::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct State {
    session: Session,
    generation: u64,
}

struct Inner<S, A> {
    store: S,
    api: A,
    state: Mutex<State>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
    unauthorized: Mutex<Option<Callback>>,
}

/// Cloneable handle to the shared session.
pub struct SessionManager<S, A> {
    inner: Arc<Inner<S, A>>,
}

impl<S, A> Clone for SessionManager<S, A> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: SessionStore, A: AuthApi> SessionManager<S, A> {
    /// Manager in the `Loading` state. Call [`init`](Self::init) next.
    pub fn new(store: S, api: A) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                api,
                state: Mutex::new(State { session: Session::loading(), generation: 0 }),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                unauthorized: Mutex::new(None),
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Start the session lifecycle by restoring persisted state.
    pub fn init(&self) -> Session {
        self.restore()
    }

    /// Detach every subscriber and the unauthorized callback, and abandon
    /// in-flight sign-ins. The session itself and storage are left intact.
    pub fn teardown(&self) {
        self.cancel_pending();
        lock(&self.inner.listeners).clear();
        *lock(&self.inner.unauthorized) = None;
        log::debug!("session manager torn down");
    }

    /// Load the persisted pair. Anything partial or unparsable is wiped and
    /// the session resolves signed out; this never fails.
    pub fn restore(&self) -> Session {
        match store::load(&self.inner.store) {
            Ok(Some((token, identity))) => {
                log::info!("restored session for {} ({})", identity.email, identity.role);
                let snapshot = {
                    let mut state = lock(&self.inner.state);
                    state.session = Session::authenticated(token, identity);
                    state.session.clone()
                };
                self.notify(&snapshot);
                snapshot
            }
            Ok(None) => {
                log::debug!("no persisted session");
                self.clear();
                self.snapshot()
            }
            Err(corruption) => {
                log::warn!("discarding persisted session: {corruption}");
                self.clear();
                self.snapshot()
            }
        }
    }

    /// Sign in with `credentials`.
    ///
    /// The identity comes from the login response when the server includes
    /// it, otherwise from `GET /me` with the new token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] when the server rejects the login,
    /// [`SessionError::Network`] on connectivity failure,
    /// [`SessionError::InvalidResponse`] when no usable token or identity
    /// comes back, [`SessionError::Storage`] when persisting fails, and
    /// [`SessionError::Cancelled`] when the attempt was superseded. The
    /// session and storage are unchanged on every error.
    pub async fn establish(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let ticket = self.begin_attempt();
        self.sign_in(ticket, credentials).await
    }

    /// Create an account, then sign in with its email and password.
    ///
    /// Registration is not rolled back if the sign-in fails; the account
    /// already exists server-side and the caller sees the sign-in error.
    /// The whole chain is one attempt: cancelling it or starting a newer one
    /// while registration is in flight skips the sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] before any request when the
    /// payload is incomplete, the registration error if the server rejects
    /// it, or any [`establish`](Self::establish) error.
    pub async fn register_then_establish(&self, registration: &Registration) -> Result<(), SessionError> {
        registration.validate().map_err(|msg| SessionError::Validation(msg.to_owned()))?;
        let ticket = self.begin_attempt();
        let profile = self.inner.api.register(registration).await?;
        log::info!("registered {} account for {}", registration.role(), profile.email);
        self.check_ticket(ticket)?;
        self.sign_in(ticket, &registration.credentials()).await
    }

    async fn sign_in(&self, ticket: u64, credentials: &Credentials) -> Result<(), SessionError> {
        let login = self.inner.api.login(credentials).await?;
        if login.access_token.trim().is_empty() {
            return Err(SessionError::InvalidResponse("login returned an empty token".to_owned()));
        }
        if !login.token_type.eq_ignore_ascii_case("bearer") {
            log::warn!("unexpected token type {:?}; treating as bearer", login.token_type);
        }
        let profile = match login.user {
            Some(profile) => profile,
            None => {
                self.check_ticket(ticket)?;
                self.inner.api.current_user(&login.access_token).await.map_err(|err| match err {
                    ApiError::Network(msg) => SessionError::Network(msg),
                    other => SessionError::InvalidResponse(format!("server did not provide an identity: {other}")),
                })?
            }
        };
        self.commit(ticket, login.access_token, Identity::from(profile))
    }

    /// Sign out: wipe storage, reset to empty, abandon in-flight sign-ins.
    pub fn clear(&self) {
        self.reset();
    }

    /// React to a `401` from any bearer call.
    ///
    /// Clears the session and fires the unauthorized callback, but only when
    /// a session was actually active, so a burst of `401`s fires it once.
    pub fn handle_unauthorized(&self) {
        if !self.reset() {
            return;
        }
        log::warn!("server rejected the session token; signed out");
        let callback = lock(&self.inner.unauthorized).clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Run a bearer request with the current token.
    ///
    /// A `401` answer signs the session out through
    /// [`handle_unauthorized`](Self::handle_unauthorized) when the token used
    /// is still the active one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without calling `request` when
    /// nobody is signed in, otherwise whatever `request` returns.
    pub async fn authorized<T, F, Fut>(&self, request: F) -> Result<T, ApiError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(token) = self.token() else {
            return Err(ApiError::Unauthorized);
        };
        let result = request(token.clone()).await;
        if matches!(result, Err(ApiError::Unauthorized)) && self.token().as_deref() == Some(token.as_str()) {
            self.handle_unauthorized();
        }
        result
    }

    /// Re-fetch the identity for the active token from `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] when signed out or the token was
    /// rejected (the session is cleared in that case), and
    /// [`SessionError::Cancelled`] when the session changed meanwhile.
    pub async fn refresh_identity(&self) -> Result<(), SessionError> {
        let Some(token) = self.token() else {
            return Err(ApiError::Unauthorized.into());
        };
        let api = &self.inner.api;
        let profile = self.authorized(|token| async move { api.current_user(&token).await }).await?;
        let identity = Identity::from(profile);
        let snapshot = {
            let mut state = lock(&self.inner.state);
            if state.session.token() != Some(token.as_str()) {
                return Err(SessionError::Cancelled);
            }
            store::save(&self.inner.store, &token, &identity)?;
            state.session = Session::authenticated(token, identity);
            state.session.clone()
        };
        self.notify(&snapshot);
        Ok(())
    }

    /// Abandon in-flight sign-ins; their responses will be discarded.
    pub fn cancel_pending(&self) {
        lock(&self.inner.state).generation += 1;
    }

    /// Register `listener`; it runs synchronously after every transition.
    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.inner.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Set the callback fired when the server rejects the active session.
    pub fn on_unauthorized(&self, callback: impl Fn() + Send + Sync + 'static) {
        *lock(&self.inner.unauthorized) = Some(Arc::new(callback));
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        lock(&self.inner.state).session.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        lock(&self.inner.state).session.token().map(str::to_owned)
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        lock(&self.inner.state).session.identity().cloned()
    }

    #[must_use]
    pub fn derived_role(&self) -> Option<Role> {
        lock(&self.inner.state).session.role()
    }

    fn begin_attempt(&self) -> u64 {
        let mut state = lock(&self.inner.state);
        state.generation += 1;
        state.generation
    }

    fn check_ticket(&self, ticket: u64) -> Result<(), SessionError> {
        if lock(&self.inner.state).generation == ticket { Ok(()) } else { Err(SessionError::Cancelled) }
    }

    fn commit(&self, ticket: u64, token: String, identity: Identity) -> Result<(), SessionError> {
        let snapshot = {
            let mut state = lock(&self.inner.state);
            if state.generation != ticket {
                log::debug!("discarding superseded sign-in response");
                return Err(SessionError::Cancelled);
            }
            store::save(&self.inner.store, &token, &identity)?;
            log::info!("signed in as {} ({})", identity.email, identity.role);
            state.session = Session::authenticated(token, identity);
            state.session.clone()
        };
        self.notify(&snapshot);
        Ok(())
    }

    /// Wipe and reset. Returns whether a session was active.
    fn reset(&self) -> bool {
        let (was_authenticated, snapshot) = {
            let mut state = lock(&self.inner.state);
            state.generation += 1;
            store::wipe(&self.inner.store);
            let was_authenticated = state.session.is_authenticated();
            state.session = Session::signed_out();
            (was_authenticated, state.session.clone())
        };
        if was_authenticated {
            log::info!("signed out");
        }
        self.notify(&snapshot);
        was_authenticated
    }

    fn notify(&self, session: &Session) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners).iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener(session);
        }
    }
}
