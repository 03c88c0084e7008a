//! Session data model and the auth wire payloads that feed it.
//!
//! DESIGN
//! ======
//! `Session` stores the bearer token and the identity as one optional pair,
//! so no reachable value holds one without the other. Identity always comes
//! from a server response (`UserProfile`); nothing here derives it from the
//! login string.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role gating which routes and endpoints are reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "HR")]
    Hr,
    Candidate,
}

impl Role {
    /// Wire name, also used as the registration path segment.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Candidate => "Candidate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hr" => Ok(Self::Hr),
            "candidate" => Ok(Self::Candidate),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Profile facts for the signed-in user, as asserted by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserProfile> for Identity {
    fn from(profile: UserProfile) -> Self {
        let full_name = match profile.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {last}", profile.first_name.trim()),
            _ => profile.first_name.trim().to_owned(),
        };
        let display_name = if full_name.is_empty() { profile.username.clone() } else { full_name };
        let id = profile.id.map_or_else(|| profile.username.clone(), |id| id.to_string());
        Self { id, display_name, email: profile.email, role: profile.role }
    }
}

/// Whether the startup restore has completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Loading,
    Resolved,
}

#[derive(Clone, PartialEq, Eq)]
struct Authenticated {
    token: String,
    identity: Identity,
}

impl fmt::Debug for Authenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticated")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Snapshot of the current authentication session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    auth: Option<Authenticated>,
}

impl Session {
    /// Session before restore has run.
    #[must_use]
    pub fn loading() -> Self {
        Self::default()
    }

    /// Resolved session with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { status: SessionStatus::Resolved, auth: None }
    }

    /// Resolved session carrying a token and its identity.
    #[must_use]
    pub fn authenticated(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            status: SessionStatus::Resolved,
            auth: Some(Authenticated { token: token.into(), identity }),
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.auth.as_ref().map(|a| &a.identity)
    }

    /// Role of the signed-in user, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity().map(|i| i.role)
    }
}

/// Login form payload for `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username_or_email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username_or_email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username_or_email: username_or_email.into(), password: password.into() }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST /login`.
///
/// `user` is optional so older servers that only return the token still
/// work; the manager then fetches the identity from `GET /me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// User record returned by registration, `/me` and (optionally) login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    pub role: Role,
}

/// Fields shared by every registration kind.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFields {
    pub username: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AccountFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountFields")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// HR account: candidate fields plus company and address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrRegistration {
    #[serde(flatten)]
    pub account: AccountFields,
    pub company_name: String,
    pub position: String,
    pub street_number: String,
    pub street_name: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Registration payload; the variant selects `/register/{Candidate|HR}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Registration {
    Candidate(AccountFields),
    Hr(HrRegistration),
}

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

impl Registration {
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Candidate(_) => Role::Candidate,
            Self::Hr(_) => Role::Hr,
        }
    }

    #[must_use]
    pub fn account(&self) -> &AccountFields {
        match self {
            Self::Candidate(account) => account,
            Self::Hr(hr) => &hr.account,
        }
    }

    /// Credentials used to sign in right after registering.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let account = self.account();
        Credentials::new(account.email.clone(), account.password.clone())
    }

    /// Check the same constraints the server enforces before sending.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first violated constraint.
    pub fn validate(&self) -> Result<(), &'static str> {
        let account = self.account();
        if account.username.trim().chars().count() < MIN_USERNAME_LEN {
            return Err("Username must be at least 3 characters long.");
        }
        if account.first_name.trim().is_empty() {
            return Err("First name is required.");
        }
        if !is_plausible_email(&account.email) {
            return Err("Enter a valid email address.");
        }
        if account.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 8 characters long.");
        }
        if let Self::Hr(hr) = self {
            let company = [
                &hr.company_name,
                &hr.position,
                &hr.street_number,
                &hr.street_name,
                &hr.postal_code,
                &hr.city,
                &hr.country,
            ];
            if company.iter().any(|field| field.trim().is_empty()) {
                return Err("Company and address fields are required.");
            }
        }
        Ok(())
    }
}

fn is_plausible_email(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
