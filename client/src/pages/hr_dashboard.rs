//! HR dashboard: application and evaluation totals.

use leptos::prelude::*;
use session::Role;
use session::models::DashboardStats;

use crate::components::protected::Protected;
#[cfg(feature = "csr")]
use crate::state::session::AppSession;

#[component]
pub fn HrDashboardPage() -> impl IntoView {
    view! {
        <Protected role=Role::Hr>
            <DashboardPanel />
        </Protected>
    }
}

#[component]
fn DashboardPanel() -> impl IntoView {
    let stats = RwSignal::new(None::<DashboardStats>);
    let error = RwSignal::new(None::<String>);

    // Fetch once on mount; the panel only mounts for a signed-in HR user.
    #[cfg(feature = "csr")]
    {
        let manager = expect_context::<AppSession>();
        leptos::task::spawn_local(async move {
            match crate::net::api::dashboard(&manager).await {
                Ok(loaded) => stats.set(Some(loaded)),
                Err(e) => error.set(Some(crate::net::api::failure_message(&e))),
            }
        });
    }

    let rows = move || {
        stats.get().map(|s| {
            let totals = [
                ("Applications", s.total_applications),
                ("Pending", s.pending_applications),
                ("Evaluated", s.evaluated_applications),
                ("Evaluations", s.total_evaluations),
                ("High scores", s.high_score_evaluations),
            ];
            let by_role = s
                .applications_by_role
                .into_iter()
                .map(|(role, count)| {
                    view! {
                        <li class="dashboard__role">
                            <span>{role}</span>
                            <span>{count}</span>
                        </li>
                    }
                })
                .collect_view();
            view! {
                <div class="dashboard__totals">
                    {totals
                        .into_iter()
                        .map(|(label, value)| {
                            view! {
                                <div class="dashboard__stat">
                                    <span class="dashboard__stat-label">{label}</span>
                                    <span class="dashboard__stat-value">{value}</span>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
                <h2>"By role"</h2>
                <ul class="dashboard__roles">{by_role}</ul>
            }
        })
    };

    view! {
        <section class="dashboard">
            <h1>"HR dashboard"</h1>
            {move || error.get().map(|msg| view! { <p class="dashboard__error">{msg}</p> })}
            <Show
                when=move || stats.get().is_some() || error.get().is_some()
                fallback=|| view! { <p class="dashboard__loading">"Loading..."</p> }
            >
                {rows}
            </Show>
        </section>
    }
}
