use super::*;

#[test]
fn with_bearer_sets_authorization_header_value() {
    let req = HttpRequest::get("/api/user/me").with_bearer("a.b.c");
    assert_eq!(req.authorization().as_deref(), Some("Bearer a.b.c"));
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.body, None);
}

#[test]
fn post_carries_json_body_without_auth() {
    let req = HttpRequest::post("/api/auth/signin", serde_json::json!({ "email": "x" }));
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.authorization(), None);
    assert_eq!(req.body, Some(serde_json::json!({ "email": "x" })));
}

#[test]
fn into_json_decodes_success_body() {
    let resp = HttpResponse { status: 200, body: r#"{"token":"a.b.c","refreshToken":"r"}"#.to_owned() };
    let pair: crate::net::types::SignInResponse = resp.into_json().unwrap();
    assert_eq!(pair.token, "a.b.c");
}

#[test]
fn into_json_maps_error_status_before_decoding() {
    let resp = HttpResponse { status: 401, body: "not json".to_owned() };
    let err = resp.into_json::<serde_json::Value>().unwrap_err();
    assert_eq!(err, AuthError::Unauthorized);
}

#[test]
fn into_json_reports_decode_failures() {
    let resp = HttpResponse { status: 200, body: "<html>".to_owned() };
    let err = resp.into_json::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, AuthError::Decode(_)));
}

#[test]
fn into_unit_accepts_any_2xx() {
    assert!(HttpResponse { status: 204, body: String::new() }.into_unit().is_ok());
    assert_eq!(
        HttpResponse { status: 500, body: String::new() }.into_unit(),
        Err(AuthError::Http { status: 500, message: String::new() })
    );
}

#[cfg(not(feature = "csr"))]
#[test]
fn browser_transport_is_inert_outside_the_browser() {
    let result = futures::executor::block_on(BrowserTransport.send(HttpRequest::get("/api/user/me")));
    assert!(matches!(result, Err(AuthError::Transport(_))));
}
