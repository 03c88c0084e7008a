//! Build-time configuration and route paths.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use session::ApiConfig;

/// Sign-in route; unauthenticated visitors are sent here.
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
/// Landing route; users lacking a required role are sent here.
pub const LANDING_PATH: &str = "/";
pub const HR_DASHBOARD_PATH: &str = "/hr/dashboard";
pub const CANDIDATE_JOBS_PATH: &str = "/jobs";

/// API base URL baked in at build time via `SCREENING_API_URL`.
pub fn api_config() -> ApiConfig {
    config_from(option_env!("SCREENING_API_URL"))
}

fn config_from(base_url: Option<&str>) -> ApiConfig {
    base_url.map(ApiConfig::new).unwrap_or_default()
}
