//! Candidate job board with city and role filters.

use leptos::prelude::*;
use session::Role;
use session::models::Job;

use crate::components::protected::Protected;
use crate::state::session::AppSession;

#[component]
pub fn CandidateJobsPage() -> impl IntoView {
    view! {
        <Protected role=Role::Candidate>
            <JobBoard />
        </Protected>
    }
}

#[component]
fn JobBoard() -> impl IntoView {
    let manager = expect_context::<AppSession>();
    let city = RwSignal::new(String::new());
    let job_role = RwSignal::new(String::new());
    let jobs = RwSignal::new(Vec::<Job>::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let search = move || {
        if busy.get_untracked() {
            return;
        }
        let filter = crate::net::api::job_filter(&city.get_untracked(), &job_role.get_untracked());
        busy.set(true);
        error.set(None);

        #[cfg(feature = "csr")]
        {
            let manager = manager.clone();
            leptos::task::spawn_local(async move {
                match crate::net::api::candidate_jobs(&manager, filter).await {
                    Ok(found) => jobs.set(found),
                    Err(e) => error.set(Some(crate::net::api::failure_message(&e))),
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&manager, filter);
            busy.set(false);
        }
    };
    search();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        search();
    };

    view! {
        <section class="jobs">
            <h1>"Open positions"</h1>
            <form class="jobs__filters" on:submit=on_submit>
                <input
                    class="login-input"
                    type="text"
                    placeholder="City"
                    prop:value=move || city.get()
                    on:input=move |ev| city.set(event_target_value(&ev))
                />
                <input
                    class="login-input"
                    type="text"
                    placeholder="Role"
                    prop:value=move || job_role.get()
                    on:input=move |ev| job_role.set(event_target_value(&ev))
                />
                <button class="login-button" type="submit" disabled=move || busy.get()>
                    "Search"
                </button>
            </form>
            {move || error.get().map(|msg| view! { <p class="jobs__error">{msg}</p> })}
            <ul class="jobs__list">
                <For
                    each=move || jobs.get()
                    key=|job| job.id
                    children=move |job: Job| {
                        view! {
                            <li class="jobs__item">
                                <h2>{job.title}</h2>
                                <p class="jobs__meta">
                                    {format!("{} · {}, {}", job.company_name, job.city, job.country)}
                                </p>
                                <p>{job.description}</p>
                            </li>
                        }
                    }
                />
            </ul>
            <Show when=move || !busy.get() && jobs.get().is_empty() && error.get().is_none()>
                <p class="jobs__empty">"No positions match these filters."</p>
            </Show>
        </section>
    }
}
