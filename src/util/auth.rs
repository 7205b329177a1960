//! Route guard: decides whether a navigation may proceed.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected page installs the same guard so redirect behavior is
//! identical across routes. Checkpoints run in order:
//!
//! 1. not authenticated → login, preserving the attempted URL
//! 2. token malformed or inside the expiry margin → evict, login with
//!    `reason=expired`
//! 3. route declares roles and the profile's role is not one of them →
//!    default landing route with `reason=insufficient_permissions`
//!
//! The decision itself ([`decide`]) is pure; [`RouteGuard::evaluate`] adds the
//! eviction side effect of checkpoint 2. A token already discarded as expired
//! at startup also redirects with `reason=expired`, once.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::config::ClientConfig;
use crate::net::api::AuthClient;
use crate::net::types::Role;
use crate::state::auth::AuthState;
use crate::state::session::Session;
use crate::util::token::now_unix_secs;

pub const REDIRECT_PARAM: &str = "redirect";
pub const REASON_PARAM: &str = "reason";
pub const REASON_EXPIRED: &str = "expired";
pub const REASON_INSUFFICIENT_PERMISSIONS: &str = "insufficient_permissions";

/// Access metadata a route declares.
///
/// No roles means any authenticated user may enter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteAccess {
    roles: Vec<String>,
}

impl RouteAccess {
    /// Any authenticated user.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Only users whose role is one of `roles`.
    pub fn roles(roles: &[Role]) -> Self {
        Self { roles: roles.iter().map(|r| r.as_str().to_owned()).collect() }
    }

    /// Only users whose role tag is one of `tags`, matched exactly.
    pub fn role_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { roles: tags.into_iter().map(Into::into).collect() }
    }

    pub fn required_roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether `state` satisfies the role requirement (checkpoint 3 only).
    pub fn admits(&self, state: &AuthState) -> bool {
        self.roles.is_empty() || state.has_any_role(self.roles.as_slice())
    }
}

/// Why a navigation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    Expired,
    InsufficientPermissions,
}

impl DenyReason {
    /// Query-string tag carried on the redirect, if any.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            DenyReason::NotAuthenticated => None,
            DenyReason::Expired => Some(REASON_EXPIRED),
            DenyReason::InsufficientPermissions => Some(REASON_INSUFFICIENT_PERMISSIONS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect { to: String, reason: DenyReason },
}

/// Run the three checkpoints over a session snapshot.
pub fn decide(state: &AuthState, token_valid: bool, access: &RouteAccess) -> Result<(), DenyReason> {
    if !state.authenticated {
        return Err(DenyReason::NotAuthenticated);
    }
    if !token_valid {
        return Err(DenyReason::Expired);
    }
    if !access.admits(state) {
        return Err(DenyReason::InsufficientPermissions);
    }
    Ok(())
}

/// Guard bound to the configured login and landing routes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    default_path: String,
}

impl RouteGuard {
    pub fn new(config: &ClientConfig) -> Self {
        Self { login_path: config.login_path.clone(), default_path: config.default_path.clone() }
    }

    /// Decide whether `attempted` may be entered, evicting a dead token.
    pub fn evaluate(&self, session: &Session, access: &RouteAccess, attempted: &str) -> GuardDecision {
        self.evaluate_at(session, access, attempted, now_unix_secs())
    }

    pub(crate) fn evaluate_at(&self, session: &Session, access: &RouteAccess, attempted: &str, now: i64) -> GuardDecision {
        let state = session.state();
        let verdict = decide(&state, session.is_valid_at(now), access);
        let reason = match verdict {
            Ok(()) => return GuardDecision::Allow,
            // Startup already discarded an expired token; report it as expiry.
            Err(DenyReason::NotAuthenticated) if session.take_expired_on_restore() => DenyReason::Expired,
            Err(reason) => reason,
        };
        let to = match reason {
            DenyReason::NotAuthenticated => self.login_redirect(attempted, None),
            DenyReason::Expired => {
                session.evict_if_invalid_at(now);
                self.login_redirect(attempted, Some(REASON_EXPIRED))
            }
            DenyReason::InsufficientPermissions => self.landing_redirect(REASON_INSUFFICIENT_PERMISSIONS),
        };
        log::debug!("guard denied {attempted}: {reason:?}");
        GuardDecision::Redirect { to, reason }
    }

    /// Login URL carrying the return target and an optional reason.
    pub fn login_redirect(&self, attempted: &str, reason: Option<&str>) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if !attempted.is_empty() && !is_same_route(attempted, &self.login_path) {
            query.append_pair(REDIRECT_PARAM, attempted);
        }
        if let Some(reason) = reason {
            query.append_pair(REASON_PARAM, reason);
        }
        with_query(&self.login_path, &query.finish())
    }

    /// Default landing URL carrying a reason.
    pub fn landing_redirect(&self, reason: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(REASON_PARAM, reason)
            .finish();
        with_query(&self.default_path, &query)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() { path.to_owned() } else { format!("{path}?{query}") }
}

fn is_same_route(attempted: &str, path: &str) -> bool {
    attempted.split(['?', '#']).next() == Some(path)
}

/// Resolve a post-login return target, refusing anything that could leave
/// the application (absolute URLs, protocol-relative `//host` paths).
pub fn safe_return_target(raw: Option<&str>, fallback: &str) -> String {
    match raw.map(str::trim) {
        Some(target) if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') => {
            target.to_owned()
        }
        _ => fallback.to_owned(),
    }
}

/// Rebuild the attempted URL from a router pathname and search string.
///
/// Accepts `search` with or without its leading `?`.
pub fn attempted_url(pathname: &str, search: &str) -> String {
    let search = search.trim_start_matches('?');
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}

/// Whether a guarded page may render its content for `state`.
///
/// False while a profile fetch is in flight or when the held token is no
/// longer valid, so nothing protected renders ahead of the redirect.
pub fn content_visible(state: &AuthState, session: &Session, access: &RouteAccess) -> bool {
    !state.loading && decide(state, session.is_valid(), access).is_ok()
}

/// Re-run the guard whenever the auth snapshot changes and redirect on
/// denial.
///
/// Evaluation waits while a profile fetch is in flight, and fires at most
/// one redirect per installation.
pub fn install_route_guard<F>(
    auth: RwSignal<AuthState>,
    session: Session,
    guard: RouteGuard,
    access: RouteAccess,
    attempted: String,
    navigate: F,
) where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let redirected = StoredValue::new(false);
    Effect::new(move || {
        let state = auth.get();
        if state.loading || redirected.get_value() {
            return;
        }
        if let GuardDecision::Redirect { to, .. } = guard.evaluate(&session, &access, &attempted) {
            redirected.set_value(true);
            navigate(&to, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Install the guard for the current route from context-provided state.
///
/// Expects `RwSignal<AuthState>`, [`AuthClient`] and [`RouteGuard`] contexts.
/// The returned memo is true once the page may render its content.
pub fn use_route_guard(access: RouteAccess) -> Memo<bool> {
    let auth = expect_context::<RwSignal<AuthState>>();
    let client = expect_context::<AuthClient>();
    let guard = expect_context::<RouteGuard>();
    let location = use_location();
    let attempted = attempted_url(&location.pathname.get_untracked(), &location.search.get_untracked());

    install_route_guard(auth, client.session().clone(), guard, access.clone(), attempted, use_navigate());

    let session = client.session().clone();
    Memo::new(move |_| content_visible(&auth.get(), &session, &access))
}
