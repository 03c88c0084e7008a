//! Top bar showing the signed-in identity and a sign-out action.

use leptos::prelude::*;
use session::{Role, Session};

use crate::config::{CANDIDATE_JOBS_PATH, HR_DASHBOARD_PATH, LANDING_PATH, LOGIN_PATH};
use crate::state::session::AppSession;

#[component]
pub fn NavBar() -> impl IntoView {
    let manager = expect_context::<AppSession>();
    let session = expect_context::<RwSignal<Session>>();

    let display_name = move || session.get().identity().map(|i| i.display_name.clone()).unwrap_or_default();
    let role_label = move || session.get().role().map(|r| r.to_string()).unwrap_or_default();
    let role_link = move || match session.get().role() {
        Some(Role::Hr) => Some(view! { <a href=HR_DASHBOARD_PATH>"Dashboard"</a> }.into_any()),
        Some(Role::Candidate) => Some(view! { <a href=CANDIDATE_JOBS_PATH>"Jobs"</a> }.into_any()),
        None => None,
    };

    let on_sign_out = move |_: leptos::ev::MouseEvent| manager.clear();

    view! {
        <header class="nav-bar">
            <a class="nav-bar__brand" href=LANDING_PATH>"Screening"</a>
            <Show
                when=move || session.get().is_authenticated()
                fallback=|| view! { <a class="nav-bar__link" href=LOGIN_PATH>"Sign in"</a> }
            >
                <nav class="nav-bar__links">{role_link}</nav>
                <span class="nav-bar__user">{display_name}</span>
                <span class="nav-bar__role">{role_label}</span>
                <button class="nav-bar__sign-out" on:click=on_sign_out.clone()>
                    "Sign out"
                </button>
            </Show>
        </header>
    }
}
