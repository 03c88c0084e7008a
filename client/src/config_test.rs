use super::*;

#[test]
fn config_from_uses_build_time_url() {
    assert_eq!(config_from(Some("https://hr.example.com/api/v1/")).base_url(), "https://hr.example.com/api/v1");
}

#[test]
fn config_from_defaults_when_unset() {
    assert_eq!(config_from(None).base_url(), session::client::DEFAULT_API_BASE_URL);
}
