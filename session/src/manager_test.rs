use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;

use futures::executor::block_on;

use super::*;
use crate::client::ScreeningClient;
use crate::error::AuthError;
use crate::guard::{self, GuardDecision};
use crate::store::{IDENTITY_KEY, MemoryStore, TOKEN_KEY};
use crate::test_support::{FlakyStore, ScriptedTransport, login_json, profile_json, scripted_client};
use crate::transport::ApiResponse;
use crate::types::{AccountFields, SessionStatus};

type TestManager = SessionManager<MemoryStore, ScreeningClient<ScriptedTransport>>;

// =============================================================
// Helpers
// =============================================================

fn manager_with(store: MemoryStore) -> TestManager {
    SessionManager::new(store, scripted_client())
}

fn manager() -> TestManager {
    manager_with(MemoryStore::new())
}

fn transport(manager: &TestManager) -> &ScriptedTransport {
    manager.api().transport()
}

fn creds(login: &str) -> Credentials {
    Credentials::new(login, "p")
}

fn hr_identity_json() -> String {
    serde_json::to_string(&Identity {
        id: "1".to_owned(),
        display_name: "Hana R".to_owned(),
        email: "hr@x.com".to_owned(),
        role: Role::Hr,
    })
    .unwrap()
}

/// Sign in as HR with the identity embedded in the login response.
fn signed_in_manager() -> TestManager {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, &login_json("tok123", Some(&profile_json(1, "hr@x.com", "HR"))));
    block_on(manager.establish(&creds("hr@x.com"))).unwrap();
    manager
}

fn candidate_registration() -> Registration {
    Registration::Candidate(AccountFields {
        username: "cand".to_owned(),
        first_name: "Cand".to_owned(),
        last_name: None,
        email: "cand@x.com".to_owned(),
        password: "password1".to_owned(),
    })
}

fn assert_paired(session: &Session) {
    assert_eq!(session.token().is_some(), session.identity().is_some(), "token/identity out of step: {session:?}");
}

// =============================================================
// Construction / restore
// =============================================================

#[test]
fn new_manager_is_loading() {
    let manager = manager();
    assert_eq!(manager.snapshot().status(), SessionStatus::Loading);
    assert_eq!(guard::evaluate(&manager.snapshot(), None), GuardDecision::Loading);
}

#[test]
fn fresh_start_resolves_signed_out_and_guard_redirects_to_login() {
    let manager = manager();
    let session = manager.init();
    assert_eq!(session.status(), SessionStatus::Resolved);
    assert!(session.token().is_none());
    assert_eq!(guard::evaluate(&session, Some(Role::Hr)), GuardDecision::RedirectToLogin);
}

#[test]
fn restore_populates_from_complete_storage() {
    let raw = hr_identity_json();
    let manager = manager_with(MemoryStore::with_entries([(TOKEN_KEY, "tok"), (IDENTITY_KEY, raw.as_str())]));
    let session = manager.init();
    assert_eq!(session.token(), Some("tok"));
    assert_eq!(manager.derived_role(), Some(Role::Hr));
}

#[test]
fn restore_degrades_every_malformed_state_to_signed_out() {
    let identity = hr_identity_json();
    let cases: Vec<Vec<(&str, &str)>> = vec![
        vec![(TOKEN_KEY, "tok")],
        vec![(IDENTITY_KEY, identity.as_str())],
        vec![(TOKEN_KEY, ""), (IDENTITY_KEY, identity.as_str())],
        vec![(TOKEN_KEY, "tok"), (IDENTITY_KEY, "not json")],
        vec![(TOKEN_KEY, "tok"), (IDENTITY_KEY, r#"{"id":"1","role":"HR"}"#)],
        vec![(TOKEN_KEY, "tok"), (IDENTITY_KEY, "[]")],
    ];
    for entries in cases {
        let manager = manager_with(MemoryStore::with_entries(entries.clone()));
        let session = manager.init();
        assert_eq!(session.status(), SessionStatus::Resolved, "{entries:?}");
        assert!(session.token().is_none(), "{entries:?}");
        assert!(session.identity().is_none(), "{entries:?}");
        assert_eq!(manager.store().get(TOKEN_KEY), None, "{entries:?}");
        assert_eq!(manager.store().get(IDENTITY_KEY), None, "{entries:?}");
    }
}

// =============================================================
// establish
// =============================================================

#[test]
fn establish_uses_identity_from_login_response() {
    let manager = signed_in_manager();
    let session = manager.snapshot();
    assert_eq!(session.token(), Some("tok123"));
    assert_eq!(session.role(), Some(Role::Hr));
    assert_eq!(manager.store().get(TOKEN_KEY).as_deref(), Some("tok123"));
    assert!(manager.store().get(IDENTITY_KEY).is_some());
    assert_eq!(transport(&manager).requests().len(), 1);
}

#[test]
fn establish_fetches_identity_when_login_returns_only_a_token() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, r#"{"access_token":"tok123","token_type":"bearer"}"#);
    transport(&manager).reply(200, &profile_json(5, "cand@x.com", "Candidate"));

    block_on(manager.establish(&creds("hr@x.com"))).unwrap();

    assert_eq!(manager.token().as_deref(), Some("tok123"));
    // Role comes from the server, not from the login string.
    assert_eq!(manager.derived_role(), Some(Role::Candidate));
    let requests = transport(&manager).requests();
    assert!(requests[1].url.ends_with("/me"));
    assert_eq!(requests[1].bearer.as_deref(), Some("tok123"));
}

#[test]
fn establish_without_any_identity_fails_and_writes_nothing() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, r#"{"access_token":"tok123","token_type":"bearer"}"#);
    transport(&manager).reply(404, r#"{"detail":"Not Found"}"#);

    let err = block_on(manager.establish(&creds("hr@x.com"))).unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)), "{err:?}");
    assert!(manager.token().is_none());
    assert_eq!(manager.store().get(TOKEN_KEY), None);
}

#[test]
fn establish_rejection_surfaces_auth_error_and_leaves_session() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(401, r#"{"detail":"Invalid email or password"}"#);

    let err = block_on(manager.establish(&creds("hr@x.com"))).unwrap_err();
    assert_eq!(err, SessionError::Auth(AuthError { status: 401, message: "Invalid email or password".to_owned() }));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(manager.snapshot(), Session::signed_out());
    assert_eq!(manager.store().get(TOKEN_KEY), None);
}

#[test]
fn establish_rejects_empty_token() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, &login_json(" ", Some(&profile_json(1, "hr@x.com", "HR"))));
    let err = block_on(manager.establish(&creds("hr@x.com"))).unwrap_err();
    assert!(matches!(err, SessionError::InvalidResponse(_)));
    assert!(!manager.snapshot().is_authenticated());
}

#[test]
fn establish_network_failure_keeps_existing_session() {
    let manager = signed_in_manager();
    transport(&manager).fail(ApiError::Network("offline".to_owned()));

    let err = block_on(manager.establish(&creds("other@x.com"))).unwrap_err();
    assert_eq!(err, SessionError::Network("offline".to_owned()));
    assert_eq!(manager.token().as_deref(), Some("tok123"));
}

#[test]
fn establish_storage_failure_leaves_session_unchanged() {
    let store = FlakyStore { fail_writes_to: Some(IDENTITY_KEY), ..Default::default() };
    let manager = SessionManager::new(store, scripted_client());
    manager.init();
    manager.api().transport().reply(201, &login_json("tok", Some(&profile_json(1, "hr@x.com", "HR"))));

    let err = block_on(manager.establish(&creds("hr@x.com"))).unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert!(manager.token().is_none());
    assert_eq!(manager.store().inner.get(TOKEN_KEY), None);
}

#[test]
fn failed_replace_keeps_previous_session_in_memory_and_storage() {
    let raw = hr_identity_json();
    let store = FlakyStore {
        inner: MemoryStore::with_entries([(TOKEN_KEY, "tok-a"), (IDENTITY_KEY, raw.as_str())]),
        fail_writes_to: Some(IDENTITY_KEY),
    };
    let manager = SessionManager::new(store, scripted_client());
    manager.init();
    manager.api().transport().reply(201, &login_json("tok-b", Some(&profile_json(2, "c@x.com", "Candidate"))));

    let err = block_on(manager.establish(&creds("c@x.com"))).unwrap_err();
    assert!(matches!(err, SessionError::Storage(_)));
    assert_eq!(manager.token().as_deref(), Some("tok-a"));
    assert_eq!(manager.store().inner.get(TOKEN_KEY).as_deref(), Some("tok-a"));
    assert_eq!(manager.store().inner.get(IDENTITY_KEY), Some(raw));
    assert_paired(&manager.snapshot());
}

// =============================================================
// Concurrency and cancellation
// =============================================================

#[test]
fn last_started_establish_wins() {
    let manager = manager();
    manager.init();
    let first_gate = transport(&manager).gate();
    let second_gate = transport(&manager).gate();

    let first_creds = creds("first@x.com");
    let second_creds = creds("second@x.com");
    let (first, second, ()) = block_on(async {
        futures::join!(manager.establish(&first_creds), manager.establish(&second_creds), async {
            let second_body = login_json("tok-second", Some(&profile_json(2, "second@x.com", "Candidate")));
            let first_body = login_json("tok-first", Some(&profile_json(1, "first@x.com", "HR")));
            second_gate.send(Ok(ApiResponse::new(201, second_body))).unwrap();
            first_gate.send(Ok(ApiResponse::new(201, first_body))).unwrap();
        })
    });

    assert_eq!(first, Err(SessionError::Cancelled));
    assert_eq!(second, Ok(()));
    assert_eq!(manager.token().as_deref(), Some("tok-second"));
    assert_eq!(manager.store().get(TOKEN_KEY).as_deref(), Some("tok-second"));
}

#[test]
fn cancel_pending_discards_in_flight_response() {
    let manager = manager();
    manager.init();
    let gate = transport(&manager).gate();
    let login = creds("hr@x.com");

    let (result, ()) = block_on(async {
        futures::join!(manager.establish(&login), async {
            manager.cancel_pending();
            gate.send(Ok(ApiResponse::new(201, login_json("tok", Some(&profile_json(1, "hr@x.com", "HR"))))))
                .unwrap();
        })
    });

    assert_eq!(result, Err(SessionError::Cancelled));
    assert!(manager.token().is_none());
    assert_eq!(manager.store().get(TOKEN_KEY), None);
}

#[test]
fn clear_during_sign_in_wins() {
    let manager = manager();
    manager.init();
    let gate = transport(&manager).gate();
    let login = creds("hr@x.com");

    let (result, ()) = block_on(async {
        futures::join!(manager.establish(&login), async {
            manager.clear();
            gate.send(Ok(ApiResponse::new(201, login_json("tok", Some(&profile_json(1, "hr@x.com", "HR"))))))
                .unwrap();
        })
    });

    assert_eq!(result, Err(SessionError::Cancelled));
    assert_eq!(manager.snapshot(), Session::signed_out());
}

// =============================================================
// register_then_establish
// =============================================================

#[test]
fn register_then_establish_signs_in_with_registration_email() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, &profile_json(9, "cand@x.com", "Candidate"));
    transport(&manager).reply(201, &login_json("tok-c", Some(&profile_json(9, "cand@x.com", "Candidate"))));

    block_on(manager.register_then_establish(&candidate_registration())).unwrap();

    assert_eq!(manager.derived_role(), Some(Role::Candidate));
    let requests = transport(&manager).requests();
    assert!(requests[0].url.ends_with("/register/Candidate"));
    assert!(requests[1].url.ends_with("/login"));
    let crate::transport::RequestBody::Json(body) = &requests[1].body else { panic!("expected json login body") };
    assert_eq!(body["username_or_email"], "cand@x.com");
}

#[test]
fn register_success_then_login_failure_surfaces_login_error() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(201, &profile_json(9, "cand@x.com", "Candidate"));
    transport(&manager).fail(ApiError::Network("connection reset".to_owned()));

    let err = block_on(manager.register_then_establish(&candidate_registration())).unwrap_err();

    assert_eq!(err, SessionError::Network("connection reset".to_owned()));
    assert_eq!(manager.snapshot(), Session::signed_out());
    // The registration request went out and was accepted; nothing undoes it.
    assert_eq!(transport(&manager).requests().len(), 2);
}

#[test]
fn register_duplicate_user_is_auth_error() {
    let manager = manager();
    manager.init();
    transport(&manager).reply(400, r#"{"detail":"User with this username or email already exists."}"#);

    let err = block_on(manager.register_then_establish(&candidate_registration())).unwrap_err();
    assert_eq!(err.user_message(), "User with this username or email already exists.");
    assert_eq!(transport(&manager).requests().len(), 1);
}

#[test]
fn register_invalid_payload_sends_nothing() {
    let manager = manager();
    manager.init();
    let Registration::Candidate(mut account) = candidate_registration() else { unreachable!() };
    account.password = "short".to_owned();

    let err = block_on(manager.register_then_establish(&Registration::Candidate(account))).unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert!(transport(&manager).requests().is_empty());
}

#[test]
fn cancel_during_registration_skips_sign_in() {
    let manager = manager();
    manager.init();
    let gate = transport(&manager).gate();
    transport(&manager).reply(201, &login_json("tok-c", Some(&profile_json(9, "cand@x.com", "Candidate"))));
    let registration = candidate_registration();

    let (result, ()) = block_on(async {
        futures::join!(manager.register_then_establish(&registration), async {
            manager.cancel_pending();
            gate.send(Ok(ApiResponse::new(201, profile_json(9, "cand@x.com", "Candidate")))).unwrap();
        })
    });

    assert_eq!(result, Err(SessionError::Cancelled));
    assert!(manager.token().is_none());
    assert_eq!(manager.store().get(TOKEN_KEY), None);
    let requests = transport(&manager).requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.ends_with("/register/Candidate"));
}

#[test]
fn newer_sign_in_during_registration_wins() {
    let manager = manager();
    manager.init();
    let gate = transport(&manager).gate();
    transport(&manager).reply(201, &login_json("tok-hr", Some(&profile_json(1, "hr@x.com", "HR"))));
    let registration = candidate_registration();
    let login = creds("hr@x.com");

    let (registered, signed_in) = block_on(async {
        futures::join!(manager.register_then_establish(&registration), async {
            let result = manager.establish(&login).await;
            gate.send(Ok(ApiResponse::new(201, profile_json(9, "cand@x.com", "Candidate")))).unwrap();
            result
        })
    });

    assert_eq!(registered, Err(SessionError::Cancelled));
    assert_eq!(signed_in, Ok(()));
    assert_eq!(manager.token().as_deref(), Some("tok-hr"));
    assert_eq!(manager.derived_role(), Some(Role::Hr));
}

// =============================================================
// clear / unauthorized
// =============================================================

#[test]
fn clear_is_idempotent() {
    let manager = signed_in_manager();
    manager.clear();
    manager.clear();
    assert_eq!(manager.snapshot(), Session::signed_out());
    assert_eq!(manager.store().get(TOKEN_KEY), None);
    assert_eq!(manager.store().get(IDENTITY_KEY), None);
}

#[test]
fn unauthorized_response_clears_and_signals_login_once() {
    let manager = signed_in_manager();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    manager.on_unauthorized(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    transport(&manager).reply(401, r#"{"detail":"Could not validate credentials"}"#);
    transport(&manager).reply(401, r#"{"detail":"Could not validate credentials"}"#);

    let api = manager.api();
    let first = block_on(manager.authorized(|token| async move { api.dashboard(&token).await }));
    let second = block_on(manager.authorized(|token| async move { api.dashboard(&token).await }));

    assert_eq!(first, Err(ApiError::Unauthorized));
    assert_eq!(second, Err(ApiError::Unauthorized));
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(manager.snapshot(), Session::signed_out());
    // The second call never reached the network: no token left to send.
    assert_eq!(transport(&manager).requests().len(), 2);
}

#[test]
fn authorized_passes_current_token_and_result() {
    let manager = signed_in_manager();
    transport(&manager).reply(200, "[]");
    let api = manager.api();
    let jobs = block_on(manager.authorized(|token| async move { api.hr_jobs(&token).await })).unwrap();
    assert!(jobs.is_empty());
    assert_eq!(transport(&manager).requests()[1].bearer.as_deref(), Some("tok123"));
    assert!(manager.snapshot().is_authenticated());
}

#[test]
fn forbidden_does_not_sign_out() {
    let manager = signed_in_manager();
    transport(&manager).reply(403, r#"{"detail":"Only HR users can view jobs"}"#);
    let api = manager.api();
    let result = block_on(manager.authorized(|token| async move { api.hr_jobs(&token).await }));
    assert!(matches!(result, Err(ApiError::Status { status: 403, .. })));
    assert!(manager.snapshot().is_authenticated());
}

#[test]
fn handle_unauthorized_when_signed_out_does_not_fire() {
    let manager = manager();
    manager.init();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    manager.on_unauthorized(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    manager.handle_unauthorized();
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

// =============================================================
// refresh_identity
// =============================================================

#[test]
fn refresh_identity_replaces_cached_identity() {
    let manager = signed_in_manager();
    transport(&manager).reply(200, &profile_json(1, "renamed@x.com", "HR"));
    block_on(manager.refresh_identity()).unwrap();
    assert_eq!(manager.identity().map(|i| i.email).as_deref(), Some("renamed@x.com"));
    assert_eq!(manager.token().as_deref(), Some("tok123"));
}

#[test]
fn refresh_identity_with_rejected_token_signs_out() {
    let manager = signed_in_manager();
    transport(&manager).reply(401, "{}");
    let err = block_on(manager.refresh_identity()).unwrap_err();
    assert!(matches!(err, SessionError::Auth(AuthError { status: 401, .. })));
    assert!(!manager.snapshot().is_authenticated());
}

// =============================================================
// Subscribers and lifecycle
// =============================================================

#[test]
fn subscribers_observe_every_transition_with_paired_state() {
    let manager = manager();
    let seen: Arc<Mutex<Vec<Session>>> = Arc::default();
    let sink = Arc::clone(&seen);
    manager.subscribe(move |session| sink.lock().unwrap().push(session.clone()));

    manager.init();
    transport(&manager).reply(201, &login_json("tok123", Some(&profile_json(1, "hr@x.com", "HR"))));
    block_on(manager.establish(&creds("hr@x.com"))).unwrap();
    manager.clear();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], Session::signed_out());
    assert_eq!(seen[1].token(), Some("tok123"));
    assert_eq!(seen[2], Session::signed_out());
    for session in seen.iter() {
        assert_paired(session);
    }
}

#[test]
fn listener_can_read_manager_without_deadlock() {
    let manager = manager();
    let reader = manager.clone();
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    manager.subscribe(move |_| *sink.lock().unwrap() = Some(reader.derived_role()));
    manager.init();
    assert_eq!(*observed.lock().unwrap(), Some(None));
}

#[test]
fn unsubscribe_stops_notifications() {
    let manager = manager();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let id = manager.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    manager.init();
    assert!(manager.unsubscribe(id));
    assert!(!manager.unsubscribe(id));
    manager.clear();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn teardown_detaches_listeners_but_keeps_session() {
    let manager = signed_in_manager();
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    manager.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    manager.teardown();
    manager.clear();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!manager.snapshot().is_authenticated());
}

#[test]
fn clones_share_state() {
    let manager = signed_in_manager();
    let other = manager.clone();
    other.clear();
    assert!(!manager.snapshot().is_authenticated());
}
