//! Durable persistence of the credential pair and the cached profile.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::sync::Arc;

use crate::net::types::UserProfile;
use crate::util::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Typed accessor over the `token` / `refreshToken` / `user` storage keys.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist both tokens. No validation happens here.
    pub fn save(&self, token: &str, refresh_token: &str) {
        self.backend.set(TOKEN_KEY, token);
        self.backend.set(REFRESH_TOKEN_KEY, refresh_token);
    }

    pub fn save_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(raw) => self.backend.set(USER_KEY, &raw),
            Err(e) => log::warn!("failed to serialize user profile: {e}"),
        }
    }

    pub fn read_token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY)
    }

    pub fn read_refresh_token(&self) -> Option<String> {
        self.backend.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Read the cached profile; a corrupt entry reads as absent.
    pub fn read_user(&self) -> Option<UserProfile> {
        let raw = self.backend.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("discarding unreadable stored user profile: {e}");
                None
            }
        }
    }

    /// Drop the cached profile, keeping the tokens.
    pub fn remove_user(&self) {
        self.backend.remove(USER_KEY);
    }

    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(REFRESH_TOKEN_KEY);
        self.backend.remove(USER_KEY);
    }
}
