//! Auth-session snapshot for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Published by [`Session`](super::session::Session) on every change and
//! mirrored into a Leptos `RwSignal` so route guards and user-aware
//! components re-render when the session moves.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::{Role, UserProfile};

/// Read-only view of the session. Carries no credential.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub authenticated: bool,
    /// A profile fetch is in flight.
    pub loading: bool,
}

impl AuthState {
    /// Exact match on the loaded profile's role tag.
    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == role)
    }

    /// Whether the loaded profile's role is one of `roles`.
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    pub fn is(&self, role: Role) -> bool {
        self.has_role(role.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.is(Role::Admin)
    }

    pub fn is_bet(&self) -> bool {
        self.is(Role::Bet)
    }

    pub fn is_supplier(&self) -> bool {
        self.is(Role::Supplier)
    }

    pub fn is_site_manager(&self) -> bool {
        self.is(Role::SiteManager)
    }

    pub fn is_subcontractor(&self) -> bool {
        self.is(Role::Subcontractor)
    }

    pub fn is_promoter(&self) -> bool {
        self.is(Role::Promoter)
    }

    /// Authenticated but the profile has not arrived yet.
    pub fn awaiting_profile(&self) -> bool {
        self.authenticated && self.user.is_none()
    }
}
