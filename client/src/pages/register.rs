//! Registration page for candidate and HR accounts.
//!
//! On success the new account is signed in straight away and the login
//! effect in this page sends the user to the landing route.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::types::{AccountFields, HrRegistration, Registration};
use session::{Role, Session};

use crate::config::{LANDING_PATH, LOGIN_PATH};
use crate::state::session::AppSession;

const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Raw form contents as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RegisterForm {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    confirm_password: String,
    company_name: String,
    position: String,
    street_number: String,
    street_name: String,
    postal_code: String,
    city: String,
    country: String,
}

/// Build the payload for `role`. Remaining field rules are checked by
/// `Registration::validate` before anything is sent.
fn build_registration(form: &RegisterForm, role: Role) -> Result<Registration, &'static str> {
    if form.password != form.confirm_password {
        return Err(PASSWORD_MISMATCH);
    }
    let last_name = form.last_name.trim();
    let account = AccountFields {
        username: form.username.trim().to_owned(),
        first_name: form.first_name.trim().to_owned(),
        last_name: (!last_name.is_empty()).then(|| last_name.to_owned()),
        email: form.email.trim().to_owned(),
        password: form.password.clone(),
    };
    Ok(match role {
        Role::Candidate => Registration::Candidate(account),
        Role::Hr => Registration::Hr(HrRegistration {
            account,
            company_name: form.company_name.trim().to_owned(),
            position: form.position.trim().to_owned(),
            street_number: form.street_number.trim().to_owned(),
            street_name: form.street_name.trim().to_owned(),
            postal_code: form.postal_code.trim().to_owned(),
            city: form.city.trim().to_owned(),
            country: form.country.trim().to_owned(),
        }),
    })
}

#[derive(Clone, Copy)]
struct FormSignals {
    username: RwSignal<String>,
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
    confirm_password: RwSignal<String>,
    company_name: RwSignal<String>,
    position: RwSignal<String>,
    street_number: RwSignal<String>,
    street_name: RwSignal<String>,
    postal_code: RwSignal<String>,
    city: RwSignal<String>,
    country: RwSignal<String>,
}

impl FormSignals {
    fn new() -> Self {
        let field = || RwSignal::new(String::new());
        Self {
            username: field(),
            first_name: field(),
            last_name: field(),
            email: field(),
            password: field(),
            confirm_password: field(),
            company_name: field(),
            position: field(),
            street_number: field(),
            street_name: field(),
            postal_code: field(),
            city: field(),
            country: field(),
        }
    }

    fn snapshot(self) -> RegisterForm {
        RegisterForm {
            username: self.username.get_untracked(),
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            email: self.email.get_untracked(),
            password: self.password.get_untracked(),
            confirm_password: self.confirm_password.get_untracked(),
            company_name: self.company_name.get_untracked(),
            position: self.position.get_untracked(),
            street_number: self.street_number.get_untracked(),
            street_name: self.street_name.get_untracked(),
            postal_code: self.postal_code.get_untracked(),
            city: self.city.get_untracked(),
            country: self.country.get_untracked(),
        }
    }
}

#[component]
fn FormInput(label: &'static str, value: RwSignal<String>, #[prop(default = "text")] kind: &'static str) -> impl IntoView {
    view! {
        <label class="register-field">
            <span class="register-field__label">{label}</span>
            <input
                class="login-input"
                type=kind
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let manager = expect_context::<AppSession>();
    let session = expect_context::<RwSignal<Session>>();
    let navigate = use_navigate();

    let role = RwSignal::new(Role::Candidate);
    let fields = FormSignals::new();
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    Effect::new(move || {
        if session.get().is_authenticated() {
            navigate(LANDING_PATH, leptos_router::NavigateOptions::default());
        }
    });

    let pending = manager.clone();
    on_cleanup(move || pending.cancel_pending());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let registration = match build_registration(&fields.snapshot(), role.get()) {
            Ok(registration) => registration,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Creating account...".to_owned());

        #[cfg(feature = "csr")]
        {
            let manager = manager.clone();
            leptos::task::spawn_local(async move {
                match manager.register_then_establish(&registration).await {
                    Ok(()) | Err(session::SessionError::Cancelled) => info.set(String::new()),
                    Err(e) => {
                        log::debug!("registration failed: {e}");
                        info.set(e.user_message());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (&manager, registration);
        }
    };

    let role_button = move |target: Role, label: &'static str| {
        view! {
            <button
                type="button"
                class="register-toggle__option"
                class:register-toggle__option--active=move || role.get() == target
                on:click=move |_| role.set(target)
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card login-card--wide">
                <h1>"Create an account"</h1>
                <div class="register-toggle">
                    {role_button(Role::Candidate, "Candidate")}
                    {role_button(Role::Hr, "HR")}
                </div>
                <form class="login-form" on:submit=on_submit>
                    <FormInput label="Username" value=fields.username />
                    <FormInput label="First name" value=fields.first_name />
                    <FormInput label="Last name" value=fields.last_name />
                    <FormInput label="Email" value=fields.email kind="email" />
                    <FormInput label="Password" value=fields.password kind="password" />
                    <FormInput label="Confirm password" value=fields.confirm_password kind="password" />
                    <Show when=move || role.get() == Role::Hr>
                        <FormInput label="Company" value=fields.company_name />
                        <FormInput label="Position" value=fields.position />
                        <FormInput label="Street number" value=fields.street_number />
                        <FormInput label="Street name" value=fields.street_name />
                        <FormInput label="Postal code" value=fields.postal_code />
                        <FormInput label="City" value=fields.city />
                        <FormInput label="Country" value=fields.country />
                    </Show>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "Already registered? "
                    <a href=LOGIN_PATH>"Sign in"</a>
                </p>
            </div>
        </div>
    }
}
