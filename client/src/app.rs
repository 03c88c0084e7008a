//! Root component: session wiring and routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds the one session manager, exposes it and its reactive mirror
//! through context, and lays out the routes. Role gating lives in the pages
//! via `Protected`; expiry redirects are handled once here.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::hooks::use_navigate;
use leptos_router::StaticSegment;

use crate::components::nav_bar::NavBar;
use crate::pages::candidate_jobs::CandidateJobsPage;
use crate::pages::home::HomePage;
use crate::pages::hr_dashboard::HrDashboardPage;
use crate::pages::login::LoginPage;
use crate::pages::register::RegisterPage;
use crate::state::session::{SessionExpiry, install};
use crate::util::auth::install_expiry_redirect;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    install(crate::config::api_config());

    view! {
        <Title text="Candidate Screening" />
        <Router>
            <ExpiryRedirect />
            <NavBar />
            <main class="app-main">
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                    <Route path=StaticSegment("") view=HomePage />
                    <Route path=StaticSegment("login") view=LoginPage />
                    <Route path=StaticSegment("register") view=RegisterPage />
                    <Route path=(StaticSegment("hr"), StaticSegment("dashboard")) view=HrDashboardPage />
                    <Route path=StaticSegment("jobs") view=CandidateJobsPage />
                </Routes>
            </main>
        </Router>
    }
}

/// Navigates to `/login` when the server rejects the session. Must sit
/// inside `<Router>` for `use_navigate`.
#[component]
fn ExpiryRedirect() -> impl IntoView {
    let expiry = expect_context::<SessionExpiry>();
    install_expiry_redirect(expiry, use_navigate());
}
