use super::*;

#[test]
fn validate_login_input_trims_login() {
    let credentials = validate_login_input("  hr@example.com ", "secret").unwrap();
    assert_eq!(credentials.username_or_email, "hr@example.com");
    assert_eq!(credentials.password, "secret");
}

#[test]
fn validate_login_input_keeps_password_verbatim() {
    let credentials = validate_login_input("hr", " spaced ").unwrap();
    assert_eq!(credentials.password, " spaced ");
}

#[test]
fn validate_login_input_requires_both_fields() {
    assert_eq!(validate_login_input("   ", "secret"), Err(MISSING_FIELDS));
    assert_eq!(validate_login_input("hr@example.com", ""), Err(MISSING_FIELDS));
}
