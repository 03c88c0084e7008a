//! Typed API calls made by the pages.
//!
//! Every call goes through `SessionManager::authorized`, so a `401` clears
//! the session and fires the expiry redirect.
//!
//! ERROR HANDLING
//! ==============
//! Pages render [`failure_message`] next to the affected panel instead of
//! panicking or propagating further.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use session::ApiError;
use session::models::{DashboardStats, Job, JobFilter};

use crate::state::session::AppSession;

/// `GET /hr/dashboard`.
///
/// # Errors
///
/// Returns the [`ApiError`] of the underlying request.
pub async fn dashboard(session: &AppSession) -> Result<DashboardStats, ApiError> {
    let api = session.api();
    session.authorized(|token| async move { api.dashboard(&token).await }).await
}

/// `GET /candidates/jobs` with optional filters.
///
/// # Errors
///
/// Returns the [`ApiError`] of the underlying request.
pub async fn candidate_jobs(session: &AppSession, filter: JobFilter) -> Result<Vec<Job>, ApiError> {
    let api = session.api();
    session.authorized(|token| async move { api.list_jobs(&token, &filter).await }).await
}

/// Filter from free-text inputs; blank inputs are omitted.
pub fn job_filter(city: &str, job_role: &str) -> JobFilter {
    let non_blank = |value: &str| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    };
    JobFilter { city: non_blank(city), job_role: non_blank(job_role) }
}

/// Message shown in place of a panel whose request failed.
pub fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_owned(),
        ApiError::Status { status: 403, .. } => "You do not have access to this page.".to_owned(),
        ApiError::Status { message, .. } => message.clone(),
        ApiError::Network(_) => "Could not reach the server.".to_owned(),
        ApiError::Decode(_) => "The server sent an unexpected response.".to_owned(),
    }
}
