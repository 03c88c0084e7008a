//! Role-gated wrapper for protected routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected page wraps its content in `Protected`. The decision is
//! re-evaluated whenever the session signal changes, so signing out (or a
//! server-side expiry) redirects without any page-specific code.

use leptos::prelude::*;
use leptos_router::components::Redirect;
use session::{Role, Session, guard};

use crate::config::LOGIN_PATH;
use crate::util::auth::redirect_target;

/// Render `children` only when the session satisfies `role`.
///
/// While the session is restoring only a loading indicator is shown, so
/// protected content never flashes before the redirect.
#[component]
pub fn Protected(#[prop(optional)] role: Option<Role>, children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();

    move || match guard::evaluate(&session.get(), role) {
        guard::GuardDecision::Loading => view! { <p class="protected__loading">"Loading..."</p> }.into_any(),
        guard::GuardDecision::Render => children(),
        decision => {
            let path = redirect_target(decision).unwrap_or(LOGIN_PATH);
            view! { <Redirect path=path /> }.into_any()
        }
    }
}
