use super::*;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::test_helpers::{MockTransport, fresh_token, memory_session};
use futures::executor::block_on;

fn client_with(transport: MockTransport) -> AuthClient {
    let (session, _) = memory_session();
    AuthClient::new(ClientConfig::default(), Arc::new(transport), session)
}

// =============================================================
// Input validation
// =============================================================

#[test]
fn validate_login_input_trims_identifier_only() {
    assert_eq!(
        validate_login_input("  771234567 ", " pass word "),
        Ok(("771234567".to_owned(), " pass word ".to_owned()))
    );
}

#[test]
fn validate_login_input_requires_both_fields() {
    assert_eq!(validate_login_input("   ", "secret1"), Err("Enter your email or phone number."));
    assert_eq!(validate_login_input("a@b.sn", ""), Err("Enter your password."));
}

#[test]
fn validate_login_input_enforces_minimum_length() {
    assert_eq!(validate_login_input("a@b.sn", "12345"), Err("Password must be at least 6 characters."));
    assert!(validate_login_input("a@b.sn", "123456").is_ok());
}

#[test]
fn validate_reset_input_requires_address_shape() {
    assert_eq!(validate_reset_input(" chef@chantier.sn "), Ok("chef@chantier.sn".to_owned()));
    assert!(validate_reset_input("chef").is_err());
    assert!(validate_reset_input("@chantier.sn").is_err());
    assert!(validate_reset_input("chef@").is_err());
}

#[test]
fn reason_notice_only_explains_expiry() {
    assert!(reason_notice(Some("expired")).is_some());
    assert_eq!(reason_notice(Some("insufficient_permissions")), None);
    assert_eq!(reason_notice(None), None);
}

// =============================================================
// sign_in
// =============================================================

#[test]
fn sign_in_chains_profile_fetch() {
    let client = client_with(
        MockTransport::new()
            .respond(200, serde_json::json!({ "token": fresh_token(), "refreshToken": "r-1" }))
            .respond(200, serde_json::json!({ "id": 3, "firstName": "Awa", "role": "ADMIN" })),
    );

    let profile = block_on(sign_in(&client, "awa@chantier.sn", "secret1")).unwrap();
    assert_eq!(profile.id, "3");
    assert_eq!(profile.role, "ADMIN");
    assert!(client.session().state().is_admin());
}

#[test]
fn sign_in_stops_at_failed_login() {
    let client = client_with(MockTransport::new().respond(401, serde_json::json!({ "message": "Bad credentials" })));

    let err = block_on(sign_in(&client, "awa@chantier.sn", "wrong-pass")).unwrap_err();
    assert_eq!(err, AuthError::Unauthorized);
    assert!(!client.session().is_authenticated());
}

#[test]
fn sign_in_keeps_session_when_profile_fetch_fails_transiently() {
    let client = client_with(
        MockTransport::new()
            .respond(200, serde_json::json!({ "token": fresh_token(), "refreshToken": "r-1" }))
            .respond(500, serde_json::json!({ "message": "database unavailable" })),
    );

    let err = block_on(sign_in(&client, "awa@chantier.sn", "secret1")).unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(client.session().is_authenticated());
    assert_eq!(client.session().current_user(), None);
}
