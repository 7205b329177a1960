use super::*;
use std::sync::Arc;

use crate::state::token_store::TokenStore;
use crate::test_helpers::{fresh_token, memory_session, sample_user, token_expiring_in};
use crate::util::storage::MemoryStore;

fn guard() -> RouteGuard {
    RouteGuard::new(&ClientConfig::default())
}

fn signed_in(role: Option<&str>) -> Session {
    let (session, _) = memory_session();
    let token = fresh_token();
    session.token_store().save(&token, "r-1");
    session.set_token(&token);
    session.set_authenticated(true);
    if let Some(role) = role {
        session.set_user(&token, sample_user(role));
    }
    session
}

// =============================================================
// decide (pure)
// =============================================================

#[test]
fn decide_checks_authentication_first() {
    let state = AuthState::default();
    assert_eq!(decide(&state, false, &RouteAccess::roles(&[Role::Admin])), Err(DenyReason::NotAuthenticated));
}

#[test]
fn decide_checks_validity_before_roles() {
    let state = AuthState { user: Some(sample_user("USER")), authenticated: true, loading: false };
    assert_eq!(decide(&state, false, &RouteAccess::roles(&[Role::Admin])), Err(DenyReason::Expired));
}

#[test]
fn decide_allows_any_authenticated_user_without_roles() {
    let state = AuthState { user: None, authenticated: true, loading: false };
    assert_eq!(decide(&state, true, &RouteAccess::authenticated()), Ok(()));
}

#[test]
fn decide_denies_role_route_while_profile_missing() {
    let state = AuthState { user: None, authenticated: true, loading: false };
    assert_eq!(
        decide(&state, true, &RouteAccess::roles(&[Role::User])),
        Err(DenyReason::InsufficientPermissions)
    );
}

#[test]
fn route_access_matches_any_declared_role() {
    let access = RouteAccess::roles(&[Role::SiteManager, Role::Promoter]);
    let state = AuthState { user: Some(sample_user("PROMOTER")), authenticated: true, loading: false };
    assert!(access.admits(&state));
    assert_eq!(access.required_roles(), ["SITE_MANAGER".to_owned(), "PROMOTER".to_owned()]);
}

#[test]
fn role_tags_are_not_normalized() {
    let access = RouteAccess::role_tags(["admin"]);
    let state = AuthState { user: Some(sample_user("ADMIN")), authenticated: true, loading: false };
    assert!(!access.admits(&state));
}

#[test]
fn deny_reason_tags() {
    assert_eq!(DenyReason::NotAuthenticated.tag(), None);
    assert_eq!(DenyReason::Expired.tag(), Some("expired"));
    assert_eq!(DenyReason::InsufficientPermissions.tag(), Some("insufficient_permissions"));
}

// =============================================================
// RouteGuard::evaluate
// =============================================================

#[test]
fn anonymous_visitor_goes_to_login_with_return_target() {
    let (session, _) = memory_session();
    let decision = guard().evaluate(&session, &RouteAccess::authenticated(), "/projects/12?tab=tasks");
    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/login?redirect=%2Fprojects%2F12%3Ftab%3Dtasks".to_owned(),
            reason: DenyReason::NotAuthenticated,
        }
    );
}

#[test]
fn expired_token_is_evicted_and_tagged() {
    let (session, backend) = memory_session();
    let token = token_expiring_in(-60);
    session.token_store().save(&token, "r-1");
    session.set_token(&token);
    session.set_authenticated(true);
    session.set_user(&token, sample_user("ADMIN"));

    assert!(!session.is_valid());
    let decision = guard().evaluate(&session, &RouteAccess::authenticated(), "/");
    assert_eq!(
        decision,
        GuardDecision::Redirect { to: "/login?redirect=%2F&reason=expired".to_owned(), reason: DenyReason::Expired }
    );
    assert!(!session.is_authenticated());
    assert_eq!(session.current_user(), None);
    assert!(backend.is_empty());
}

#[test]
fn token_inside_margin_counts_as_expired() {
    let (session, _) = memory_session();
    session.set_token(&token_expiring_in(4 * 60));
    session.set_authenticated(true);
    let decision = guard().evaluate(&session, &RouteAccess::authenticated(), "/");
    assert!(matches!(decision, GuardDecision::Redirect { reason: DenyReason::Expired, .. }));
}

#[test]
fn wrong_role_redirects_to_landing_without_teardown() {
    let session = signed_in(Some("USER"));
    let decision = guard().evaluate(&session, &RouteAccess::roles(&[Role::Admin]), "/admin");
    assert_eq!(
        decision,
        GuardDecision::Redirect {
            to: "/?reason=insufficient_permissions".to_owned(),
            reason: DenyReason::InsufficientPermissions,
        }
    );
    assert!(session.is_authenticated());
    assert!(session.current_user().is_some());
}

#[test]
fn matching_role_is_allowed() {
    let session = signed_in(Some("ADMIN"));
    let decision = guard().evaluate(&session, &RouteAccess::roles(&[Role::Admin]), "/admin");
    assert_eq!(decision, GuardDecision::Allow);
}

#[test]
fn evaluate_at_uses_supplied_clock() {
    let session = signed_in(Some("USER"));
    let later = now_unix_secs() + 2 * 24 * 60 * 60;
    let decision = guard().evaluate_at(&session, &RouteAccess::authenticated(), "/", later);
    assert!(matches!(decision, GuardDecision::Redirect { reason: DenyReason::Expired, .. }));
}

// =============================================================
// Redirect URLs
// =============================================================

#[test]
fn login_redirect_omits_self_reference() {
    let g = guard();
    assert_eq!(g.login_redirect("/login?reason=expired", None), "/login");
    assert_eq!(g.login_redirect("", Some(REASON_EXPIRED)), "/login?reason=expired");
}

#[test]
fn redirects_follow_configured_paths() {
    let config = ClientConfig {
        login_path: "/connexion".to_owned(),
        default_path: "/tableau".to_owned(),
        ..ClientConfig::default()
    };
    let g = RouteGuard::new(&config);
    assert_eq!(g.login_redirect("/x", None), "/connexion?redirect=%2Fx");
    assert_eq!(g.landing_redirect("insufficient_permissions"), "/tableau?reason=insufficient_permissions");
}

#[test]
fn safe_return_target_only_accepts_local_paths() {
    assert_eq!(safe_return_target(Some("/projects/3"), "/"), "/projects/3");
    assert_eq!(safe_return_target(Some("https://evil.test"), "/"), "/");
    assert_eq!(safe_return_target(Some("//evil.test/x"), "/"), "/");
    assert_eq!(safe_return_target(Some("/\\evil.test"), "/"), "/");
    assert_eq!(safe_return_target(None, "/home"), "/home");
}

#[test]
fn attempted_url_normalizes_search_prefix() {
    assert_eq!(attempted_url("/admin", ""), "/admin");
    assert_eq!(attempted_url("/admin", "tab=users"), "/admin?tab=users");
    assert_eq!(attempted_url("/admin", "?tab=users"), "/admin?tab=users");
}

#[test]
fn expired_token_discarded_at_startup_redirects_with_reason_once() {
    let backend = MemoryStore::new();
    let store = TokenStore::new(Arc::new(backend.clone()));
    store.save(&token_expiring_in(-60), "r-1");
    store.save_user(&sample_user("ADMIN"));

    let session = Session::restore(store);
    assert!(backend.is_empty());

    let decision = guard().evaluate(&session, &RouteAccess::roles(&[Role::Admin]), "/admin");
    assert_eq!(
        decision,
        GuardDecision::Redirect { to: "/login?redirect=%2Fadmin&reason=expired".to_owned(), reason: DenyReason::Expired }
    );

    let again = guard().evaluate(&session, &RouteAccess::roles(&[Role::Admin]), "/admin");
    assert_eq!(
        again,
        GuardDecision::Redirect { to: "/login?redirect=%2Fadmin".to_owned(), reason: DenyReason::NotAuthenticated }
    );
}

#[test]
fn empty_storage_redirects_without_reason() {
    let session = Session::restore(TokenStore::new(Arc::new(MemoryStore::new())));
    let decision = guard().evaluate(&session, &RouteAccess::authenticated(), "/");
    assert_eq!(
        decision,
        GuardDecision::Redirect { to: "/login?redirect=%2F".to_owned(), reason: DenyReason::NotAuthenticated }
    );
}

// =============================================================
// content_visible
// =============================================================

#[test]
fn content_hidden_when_token_expired() {
    let (session, _) = memory_session();
    let token = token_expiring_in(-60);
    session.set_token(&token);
    session.set_authenticated(true);
    session.set_user(&token, sample_user("ADMIN"));

    assert!(!content_visible(&session.state(), &session, &RouteAccess::authenticated()));
}

#[test]
fn content_hidden_while_profile_loading() {
    let session = signed_in(Some("ADMIN"));
    session.set_loading(true);
    assert!(!content_visible(&session.state(), &session, &RouteAccess::authenticated()));
    session.set_loading(false);
    assert!(content_visible(&session.state(), &session, &RouteAccess::roles(&[Role::Admin])));
}
