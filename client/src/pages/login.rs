//! Login page: email or username plus password.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::Session;
use session::types::Credentials;

use crate::config::{LANDING_PATH, REGISTER_PATH};
use crate::state::session::AppSession;

const MISSING_FIELDS: &str = "Enter your email or username and password.";

fn validate_login_input(login: &str, password: &str) -> Result<Credentials, &'static str> {
    let login = login.trim();
    if login.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok(Credentials::new(login, password))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let manager = expect_context::<AppSession>();
    let session = expect_context::<RwSignal<Session>>();
    let navigate = use_navigate();

    let login = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    // Signed in (now or already): leave for the landing page.
    Effect::new(move || {
        if session.get().is_authenticated() {
            navigate(LANDING_PATH, leptos_router::NavigateOptions::default());
        }
    });

    // A sign-in still pending when the page goes away must not land later.
    let pending = manager.clone();
    on_cleanup(move || pending.cancel_pending());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_login_input(&login.get(), &password.get()) {
            Ok(credentials) => credentials,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "csr")]
        {
            let manager = manager.clone();
            leptos::task::spawn_local(async move {
                match manager.establish(&credentials).await {
                    Ok(()) | Err(session::SessionError::Cancelled) => info.set(String::new()),
                    Err(e) => {
                        log::debug!("sign-in failed: {e}");
                        info.set(e.user_message());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&manager, credentials);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Sign in"</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Email or username"
                        prop:value=move || login.get()
                        on:input=move |ev| login.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "No account yet? "
                    <a href=REGISTER_PATH>"Register"</a>
                </p>
            </div>
        </div>
    }
}
