use futures::executor::block_on;
use session::types::{Credentials, LoginResponse, Registration, UserProfile};
use session::{ApiError, MemoryStore, Role};

use super::*;

struct FixedAuth;

impl AuthApi for FixedAuth {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        Ok(LoginResponse {
            access_token: "tok".to_owned(),
            token_type: "bearer".to_owned(),
            user: Some(UserProfile {
                id: Some(4),
                username: "rita".to_owned(),
                first_name: "Rita".to_owned(),
                last_name: None,
                email: credentials.username_or_email.clone(),
                role: Role::Hr,
            }),
        })
    }

    async fn register(&self, _registration: &Registration) -> Result<UserProfile, ApiError> {
        Err(ApiError::Network("offline".to_owned()))
    }

    async fn current_user(&self, _token: &str) -> Result<UserProfile, ApiError> {
        Err(ApiError::Unauthorized)
    }
}

fn bridged() -> (SessionManager<MemoryStore, FixedAuth>, RwSignal<Session>, SessionExpiry) {
    let manager = SessionManager::new(MemoryStore::new(), FixedAuth);
    let session = RwSignal::new(manager.snapshot());
    let expiry = SessionExpiry(RwSignal::new(0));
    bridge(&manager, session, expiry);
    manager.init();
    (manager, session, expiry)
}

#[test]
fn bridge_mirrors_transitions_into_signal() {
    let owner = Owner::new();
    owner.with(|| {
        let (manager, session, _) = bridged();
        assert_eq!(session.get_untracked(), Session::signed_out());

        block_on(manager.establish(&Credentials::new("rita@x.com", "password1"))).unwrap();
        assert_eq!(session.get_untracked().role(), Some(Role::Hr));

        manager.clear();
        assert!(!session.get_untracked().is_authenticated());
    });
}

#[test]
fn bridge_counts_unauthorized_sign_outs() {
    let owner = Owner::new();
    owner.with(|| {
        let (manager, _, expiry) = bridged();
        manager.handle_unauthorized();
        assert_eq!(expiry.0.get_untracked(), 0);

        block_on(manager.establish(&Credentials::new("rita@x.com", "password1"))).unwrap();
        manager.handle_unauthorized();
        assert_eq!(expiry.0.get_untracked(), 1);
    });
}

#[test]
fn install_resolves_signed_out_without_browser_storage() {
    let owner = Owner::new();
    owner.with(|| {
        let manager = install(session::ApiConfig::default());
        let session = expect_context::<RwSignal<Session>>();
        assert_eq!(session.get_untracked(), Session::signed_out());
        assert!(manager.token().is_none());
        assert!(use_context::<AppSession>().is_some());
    });
}
