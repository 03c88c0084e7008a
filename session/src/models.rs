//! REST DTOs for the screening endpoints.
//!
//! These mirror the backend response schemas. Timestamps stay as the ISO
//! strings the server emits; nothing in the client does date arithmetic.

#[cfg(test)]
#[path = "models_test.rs"]
mod models_test;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A job posting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default)]
    pub skills_required: Vec<String>,
    pub is_active: bool,
    pub posted_at: String,
    pub created_by: i64,
    pub company_name: String,
}

/// Body of `POST /hr/jobs`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub country: String,
    pub zip_code: String,
    pub skills_required: Vec<String>,
    pub is_active: bool,
}

/// Query filter for `GET /candidates/jobs`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub city: Option<String>,
    pub job_role: Option<String>,
}

/// A submitted candidate application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub birthdate: Option<String>,
    pub cv_filename: String,
    pub job_role: String,
    pub educational_qualification: Option<String>,
    pub job_history: Option<String>,
    pub skills: Option<String>,
    pub application_status: String,
    pub submitted_at: String,
    pub processed_at: Option<String>,
}

/// One page of `GET /candidates/applications`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPage {
    pub applications: Vec<Application>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Paging and filter parameters for the application list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationQuery {
    pub page: u32,
    pub per_page: u32,
    pub status: Option<String>,
    pub job_role: Option<String>,
}

impl Default for ApplicationQuery {
    fn default() -> Self {
        Self { page: 1, per_page: 20, status: None, job_role: None }
    }
}

/// Paging and status filter for `GET /hr/evaluations`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationQuery {
    pub page: u32,
    pub per_page: u32,
    pub status: Option<String>,
}

impl Default for EvaluationQuery {
    fn default() -> Self {
        Self { page: 1, per_page: 20, status: None }
    }
}

/// CV file attached to an application.
#[derive(Clone, PartialEq, Eq)]
pub struct CvUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for CvUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CvUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart fields of `POST /candidates/apply`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewApplication {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub job_role: String,
    pub cv: CvUpload,
}

/// AI evaluation attached to an application, plus any HR review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    pub application_id: i64,
    pub candidate_summary: Option<String>,
    pub ai_score: Option<f64>,
    pub ai_considerations: Option<String>,
    pub job_profile_requirements: Option<String>,
    pub alignment_analysis: Option<String>,
    pub hr_reviewed: bool,
    pub hr_score: Option<f64>,
    pub hr_notes: Option<String>,
    pub hr_decision: Option<HrDecision>,
    pub evaluation_status: String,
    pub evaluated_at: Option<String>,
    pub exported_to_sheets: bool,
}

/// Human decision recorded by HR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HrDecision {
    Accept,
    Reject,
    Interview,
    Pending,
}

impl FromStr for HrDecision {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "interview" => Ok(Self::Interview),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

/// Body of `POST /candidates/applications/{id}/review`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HrReview {
    pub hr_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_notes: Option<String>,
    pub hr_decision: HrDecision,
}

/// Aggregates returned by `GET /hr/dashboard`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_applications: u64,
    pub pending_applications: u64,
    pub evaluated_applications: u64,
    pub total_evaluations: u64,
    pub high_score_evaluations: u64,
    #[serde(default)]
    pub applications_by_role: BTreeMap<String, u64>,
    #[serde(default)]
    pub google_sheets_available: bool,
}

/// Evaluation criteria for one job role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfile {
    pub id: i64,
    pub role: String,
    pub profile_wanted: String,
    pub required_skills: Option<String>,
    pub experience_level: Option<String>,
    pub education_requirements: Option<String>,
    pub sheets_source_url: Option<String>,
    pub last_sync_at: Option<String>,
    pub sync_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /hr/job-profiles`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfileDraft {
    pub role: String,
    pub profile_wanted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets_source_url: Option<String>,
}

/// Body of `PUT /hr/job-profiles/{id}`. Only the fields that are set are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_wanted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheets_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_enabled: Option<bool>,
}

/// Body of `POST /hr/import-job-profiles`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsImportRequest {
    pub spreadsheet_url: String,
    pub sheet_name: String,
    pub role_column: String,
    pub profile_column: String,
}

impl SheetsImportRequest {
    /// Request with the server's default sheet and column names.
    #[must_use]
    pub fn new(spreadsheet_url: impl Into<String>) -> Self {
        Self {
            spreadsheet_url: spreadsheet_url.into(),
            sheet_name: "Sheet1".to_owned(),
            role_column: "Role".to_owned(),
            profile_column: "Profile Wanted".to_owned(),
        }
    }
}

/// Result of a Google Sheets profile import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub message: String,
    #[serde(default)]
    pub imported: u64,
    #[serde(default)]
    pub updated: u64,
    #[serde(default)]
    pub total: u64,
}

/// `{"message": ...}` acknowledgements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Answer of `POST /hr/create-results-spreadsheet`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsSpreadsheet {
    pub message: String,
    pub url: Option<String>,
}

/// Answer of `POST /hr/jobs/import-from-sheets`. The server currently only
/// explains how to create jobs another way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobImportNotice {
    pub message: String,
    #[serde(default)]
    pub instructions: Option<String>,
}
