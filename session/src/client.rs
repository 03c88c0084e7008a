//! Typed REST client for the screening API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every endpoint the front-ends use is a method here, built on top of a
//! [`Transport`]. Bearer calls take the token explicitly; wrapping them in
//! `SessionManager::authorized` is what turns a `401` into a sign-out.
//!
//! ERROR HANDLING
//! ==============
//! A `401` on a bearer request becomes [`ApiError::Unauthorized`]. A `401` on
//! a public request (login, registration) is an ordinary rejection carrying
//! the server's detail message.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{
    Application, ApplicationPage, ApplicationQuery, DashboardStats, Evaluation, EvaluationQuery, HrReview,
    ImportSummary, Job, JobDraft, JobFilter, JobImportNotice, JobProfile, JobProfileDraft, JobProfileUpdate,
    MessageResponse, NewApplication, ResultsSpreadsheet, SheetsImportRequest,
};
use crate::transport::{ApiRequest, ApiResponse, FormField, Method, RequestBody, Transport};
use crate::types::{Credentials, LoginResponse, Registration, Role, UserProfile};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Where the API lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Config for `base_url`; blank input falls back to [`DEFAULT_API_BASE_URL`].
    #[must_use]
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() { DEFAULT_API_BASE_URL } else { trimmed };
        Self { base_url: base_url.to_owned() }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path beginning with `/`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// The authentication endpoints the session manager depends on.
pub trait AuthApi {
    /// `POST /login`.
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<LoginResponse, ApiError>>;

    /// `POST /register/{Candidate|HR}`.
    fn register(&self, registration: &Registration) -> impl Future<Output = Result<UserProfile, ApiError>>;

    /// `GET /me` with `token`.
    fn current_user(&self, token: &str) -> impl Future<Output = Result<UserProfile, ApiError>>;
}

/// REST client over any [`Transport`].
#[derive(Clone, Debug)]
pub struct ScreeningClient<T> {
    transport: T,
    config: ApiConfig,
}

impl<T: Transport> ScreeningClient<T> {
    #[must_use]
    pub fn new(transport: T, config: ApiConfig) -> Self {
        Self { transport, config }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: RequestBody,
    ) -> Result<R, ApiError> {
        let request = ApiRequest {
            method,
            url: self.config.url(path),
            bearer: bearer.map(str::to_owned),
            body,
        };
        log::debug!("{} {}", method.as_str(), request.url);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            log::debug!("{} {} -> {}", method.as_str(), path, response.status);
        }
        decode(response, bearer.is_some())
    }

    // =========================================================
    // Candidate endpoints
    // =========================================================

    /// `GET /candidates/jobs`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn list_jobs(&self, token: &str, filter: &JobFilter) -> Result<Vec<Job>, ApiError> {
        self.call(Method::Get, &jobs_path(filter), Some(token), RequestBody::Empty).await
    }

    /// `POST /candidates/apply` with the CV as a multipart file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn apply(&self, token: &str, application: &NewApplication) -> Result<Application, ApiError> {
        let body = RequestBody::Multipart(application_form(application));
        self.call(Method::Post, "/candidates/apply", Some(token), body).await
    }

    /// `GET /candidates/applications`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn list_applications(&self, token: &str, query: &ApplicationQuery) -> Result<ApplicationPage, ApiError> {
        self.call(Method::Get, &applications_path(query), Some(token), RequestBody::Empty).await
    }

    /// `GET /candidates/applications/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn application(&self, token: &str, id: i64) -> Result<Application, ApiError> {
        self.call(Method::Get, &application_path(id, ""), Some(token), RequestBody::Empty).await
    }

    /// `GET /candidates/applications/{id}/evaluation`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn evaluation(&self, token: &str, id: i64) -> Result<Evaluation, ApiError> {
        self.call(Method::Get, &application_path(id, "/evaluation"), Some(token), RequestBody::Empty).await
    }

    /// `POST /candidates/applications/{id}/review`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn submit_review(&self, token: &str, id: i64, review: &HrReview) -> Result<MessageResponse, ApiError> {
        self.call(Method::Post, &application_path(id, "/review"), Some(token), json_body(review)?).await
    }

    /// `POST /candidates/applications/{id}/reprocess`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn reprocess_application(&self, token: &str, id: i64) -> Result<MessageResponse, ApiError> {
        self.call(Method::Post, &application_path(id, "/reprocess"), Some(token), RequestBody::Empty).await
    }

    // =========================================================
    // HR endpoints
    // =========================================================

    /// `GET /hr/dashboard`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn dashboard(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.call(Method::Get, "/hr/dashboard", Some(token), RequestBody::Empty).await
    }

    /// `GET /hr/jobs`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn hr_jobs(&self, token: &str) -> Result<Vec<Job>, ApiError> {
        self.call(Method::Get, "/hr/jobs", Some(token), RequestBody::Empty).await
    }

    /// `GET /hr/jobs/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn hr_job(&self, token: &str, id: i64) -> Result<Job, ApiError> {
        self.call(Method::Get, &format!("/hr/jobs/{id}"), Some(token), RequestBody::Empty).await
    }

    /// `PUT /hr/jobs/{id}`. Every field of `draft` replaces the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn update_job(&self, token: &str, id: i64, draft: &JobDraft) -> Result<Job, ApiError> {
        self.call(Method::Put, &format!("/hr/jobs/{id}"), Some(token), json_body(draft)?).await
    }

    /// `POST /hr/jobs/import-from-sheets`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status; `503`
    /// when the server has no Sheets credentials.
    pub async fn import_jobs(&self, token: &str, request: &SheetsImportRequest) -> Result<JobImportNotice, ApiError> {
        self.call(Method::Post, "/hr/jobs/import-from-sheets", Some(token), json_body(request)?).await
    }

    /// `GET /hr/evaluations`, every candidate evaluation a page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn hr_evaluations(&self, token: &str, query: &EvaluationQuery) -> Result<Vec<Evaluation>, ApiError> {
        self.call(Method::Get, &evaluations_path(query), Some(token), RequestBody::Empty).await
    }

    /// `POST /hr/create-results-spreadsheet`. `name` falls back to the
    /// server's default title when `None` or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status; `503`
    /// when the server has no Sheets credentials.
    pub async fn create_results_spreadsheet(
        &self,
        token: &str,
        name: Option<&str>,
    ) -> Result<ResultsSpreadsheet, ApiError> {
        let query = query_string(&[("spreadsheet_name", name.map(str::to_owned))]);
        let path = format!("/hr/create-results-spreadsheet{query}");
        self.call(Method::Post, &path, Some(token), RequestBody::Empty).await
    }

    /// `POST /hr/jobs`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn create_job(&self, token: &str, draft: &JobDraft) -> Result<Job, ApiError> {
        self.call(Method::Post, "/hr/jobs", Some(token), json_body(draft)?).await
    }

    /// `DELETE /hr/jobs/{id}`. The server deactivates jobs that have applications.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_job(&self, token: &str, id: i64) -> Result<MessageResponse, ApiError> {
        self.call(Method::Delete, &format!("/hr/jobs/{id}"), Some(token), RequestBody::Empty).await
    }

    /// `GET /hr/job-profiles`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn job_profiles(&self, token: &str) -> Result<Vec<JobProfile>, ApiError> {
        self.call(Method::Get, "/hr/job-profiles", Some(token), RequestBody::Empty).await
    }

    /// `POST /hr/job-profiles`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn create_job_profile(&self, token: &str, draft: &JobProfileDraft) -> Result<JobProfile, ApiError> {
        self.call(Method::Post, "/hr/job-profiles", Some(token), json_body(draft)?).await
    }

    /// `GET /hr/job-profiles/{role}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status; `404`
    /// when no profile exists for `role`.
    pub async fn job_profile(&self, token: &str, role: &str) -> Result<JobProfile, ApiError> {
        self.call(Method::Get, &job_profile_path(role), Some(token), RequestBody::Empty).await
    }

    /// `PUT /hr/job-profiles/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn update_job_profile(
        &self,
        token: &str,
        id: i64,
        update: &JobProfileUpdate,
    ) -> Result<JobProfile, ApiError> {
        self.call(Method::Put, &format!("/hr/job-profiles/{id}"), Some(token), json_body(update)?).await
    }

    /// `DELETE /hr/job-profiles/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn delete_job_profile(&self, token: &str, id: i64) -> Result<MessageResponse, ApiError> {
        self.call(Method::Delete, &format!("/hr/job-profiles/{id}"), Some(token), RequestBody::Empty).await
    }

    /// `POST /hr/import-job-profiles` from a Google Sheets document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-2xx status; `503`
    /// when the server has no Sheets credentials.
    pub async fn import_job_profiles(
        &self,
        token: &str,
        request: &SheetsImportRequest,
    ) -> Result<ImportSummary, ApiError> {
        self.call(Method::Post, "/hr/import-job-profiles", Some(token), json_body(request)?).await
    }
}

impl<T: Transport> AuthApi for ScreeningClient<T> {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.call(Method::Post, "/login", None, json_body(credentials)?).await
    }

    async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let path = register_path(registration.role());
        self.call(Method::Post, &path, None, json_body(registration)?).await
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.call(Method::Get, "/me", Some(token), RequestBody::Empty).await
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::Decode(format!("could not encode request: {e}")))
}

/// Interpret a response. `bearer` marks requests whose `401` means the
/// session itself is no longer valid.
fn decode<R: DeserializeOwned>(response: ApiResponse, bearer: bool) -> Result<R, ApiError> {
    if response.status == 401 && bearer {
        return Err(ApiError::Unauthorized);
    }
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            message: error_message(response.status, &response.body),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Extract a display message from a FastAPI error body.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    let fallback = || format!("request failed: {status}");
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> =
                items.iter().filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str)).collect();
            if messages.is_empty() { fallback() } else { messages.join("; ") }
        }
        _ => value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(fallback, str::to_owned),
    }
}

fn register_path(role: Role) -> String {
    format!("/register/{}", role.as_str())
}

fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
            Some(format!("{key}={}", urlencoding::encode(value)))
        })
        .collect();
    if encoded.is_empty() { String::new() } else { format!("?{}", encoded.join("&")) }
}

fn jobs_path(filter: &JobFilter) -> String {
    let query = query_string(&[("city", filter.city.clone()), ("job_role", filter.job_role.clone())]);
    format!("/candidates/jobs{query}")
}

fn applications_path(query: &ApplicationQuery) -> String {
    let query = query_string(&[
        ("page", Some(query.page.max(1).to_string())),
        ("per_page", Some(query.per_page.max(1).to_string())),
        ("status", query.status.clone()),
        ("job_role", query.job_role.clone()),
    ]);
    format!("/candidates/applications{query}")
}

fn evaluations_path(query: &EvaluationQuery) -> String {
    let query = query_string(&[
        ("page", Some(query.page.max(1).to_string())),
        ("per_page", Some(query.per_page.max(1).to_string())),
        ("status", query.status.clone()),
    ]);
    format!("/hr/evaluations{query}")
}

fn job_profile_path(role: &str) -> String {
    format!("/hr/job-profiles/{}", urlencoding::encode(role.trim()))
}

fn application_path(id: i64, suffix: &str) -> String {
    format!("/candidates/applications/{id}{suffix}")
}

fn application_form(application: &NewApplication) -> Vec<FormField> {
    let text = |name: &str, value: &str| FormField::Text { name: name.to_owned(), value: value.to_owned() };
    let mut fields = vec![text("name", &application.name), text("email", &application.email)];
    if let Some(phone) = application.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        fields.push(text("phone", phone));
    }
    fields.push(text("job_role", &application.job_role));
    fields.push(FormField::File {
        name: "cv_file".to_owned(),
        filename: application.cv.filename.clone(),
        content_type: application.cv.content_type.clone(),
        bytes: application.cv.bytes.clone(),
    });
    fields
}
