use super::*;

#[test]
fn redirect_target_maps_redirect_decisions() {
    assert_eq!(redirect_target(GuardDecision::RedirectToLogin), Some("/login"));
    assert_eq!(redirect_target(GuardDecision::RedirectToLanding), Some("/"));
}

#[test]
fn redirect_target_is_none_for_rendering_decisions() {
    assert_eq!(redirect_target(GuardDecision::Loading), None);
    assert_eq!(redirect_target(GuardDecision::Render), None);
}

// =============================================================
// Expiry redirect
// =============================================================

type Visits = std::sync::Arc<std::sync::Mutex<Vec<(String, bool)>>>;

fn recording_navigate(visits: &Visits) -> impl Fn(&str, NavigateOptions) + Clone + 'static {
    let visits = std::sync::Arc::clone(visits);
    move |path: &str, options: NavigateOptions| visits.lock().unwrap().push((path.to_owned(), options.replace))
}

#[test]
fn expiry_redirect_waits_for_first_expiry_then_replaces_to_login() {
    let _ = any_spawner::Executor::init_futures_executor();
    let owner = Owner::new();
    owner.set();
    let expiry = SessionExpiry(RwSignal::new(0));
    let visits = Visits::default();

    install_expiry_redirect(expiry, recording_navigate(&visits));
    any_spawner::Executor::poll_local();
    assert!(visits.lock().unwrap().is_empty(), "navigated before any expiry");

    expiry.0.update(|count| *count += 1);
    any_spawner::Executor::poll_local();
    assert_eq!(*visits.lock().unwrap(), vec![("/login".to_owned(), true)]);
}
