//! Authenticated landing page.

use leptos::prelude::*;
use session::{Role, Session};

use crate::components::protected::Protected;
use crate::config::{CANDIDATE_JOBS_PATH, HR_DASHBOARD_PATH};

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <Protected>
            <Welcome />
        </Protected>
    }
}

#[component]
fn Welcome() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();

    let greeting = move || {
        session
            .get()
            .identity()
            .map_or_else(String::new, |i| format!("Welcome, {}", i.display_name))
    };
    let next_step = move || match session.get().role() {
        Some(Role::Hr) => view! {
            <a class="home__action" href=HR_DASHBOARD_PATH>"Open the HR dashboard"</a>
        }
        .into_any(),
        Some(Role::Candidate) => view! {
            <a class="home__action" href=CANDIDATE_JOBS_PATH>"Browse open positions"</a>
        }
        .into_any(),
        None => ().into_any(),
    };

    view! {
        <section class="home">
            <h1>{greeting}</h1>
            {next_step}
        </section>
    }
}
