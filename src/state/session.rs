//! Process-wide authentication session.
//!
//! DESIGN
//! ======
//! One `Session` is built at startup and handed out by cloning (all clones
//! share state). Reads are side-effect free; invalid credentials are only
//! evicted through [`Session::evict_if_invalid`], which the route guard calls
//! before every decision. Mutators are crate-private so only the auth client
//! and the guard can move the session.
//!
//! Changes are published to subscribers as [`AuthState`] snapshots after the
//! internal lock has been released, so callbacks may read the session.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::types::UserProfile;
use crate::state::auth::AuthState;
use crate::state::token_store::TokenStore;
use crate::util::token::{is_valid_at, is_well_formed, now_unix_secs};

type Callback = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Handle returned by [`Session::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Clone, Debug, Default)]
struct SessionInner {
    token: Option<String>,
    user: Option<UserProfile>,
    authenticated: bool,
    loading: bool,
    /// Set when startup discarded an expired token; consumed by the guard.
    expired_on_restore: bool,
}

impl SessionInner {
    fn snapshot(&self) -> AuthState {
        AuthState { user: self.user.clone(), authenticated: self.authenticated, loading: self.loading }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
    subscribers: Arc<Mutex<Subscribers>>,
    store: TokenStore,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Session")
            .field("has_token", &inner.token.is_some())
            .field("authenticated", &inner.authenticated)
            .field("user", &inner.user.as_ref().map(|u| u.id.as_str()))
            .field("loading", &inner.loading)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Empty, unauthenticated session persisting through `store`.
    pub fn new(store: TokenStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner::default())),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            store,
        }
    }

    /// Build a session hydrated from durable storage.
    ///
    /// A stored token is adopted only if it is well formed and not inside the
    /// expiry margin; otherwise all persisted auth keys are wiped. The cached
    /// profile is restored alongside a usable token.
    pub fn restore(store: TokenStore) -> Self {
        Self::restore_at(store, now_unix_secs())
    }

    pub(crate) fn restore_at(store: TokenStore, now: i64) -> Self {
        let session = Self::new(store);
        let Some(token) = session.store.read_token() else {
            return session;
        };
        if !is_valid_at(&token, now) {
            log::info!("discarding stored token: malformed or expired");
            session.store.clear();
            session.lock().expired_on_restore = true;
            return session;
        }
        let user = session.store.read_user();
        {
            let mut inner = session.lock();
            inner.token = Some(token);
            inner.authenticated = true;
            inner.user = user;
        }
        log::info!("session restored from storage");
        session
    }

    // =============================================================
    // Reads
    // =============================================================

    /// Current snapshot for rendering.
    pub fn state(&self) -> AuthState {
        self.lock().snapshot()
    }

    /// The bearer token, if one is held. Does not validate.
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    /// Whether the held token is well formed and outside the expiry margin.
    /// A missing token is invalid.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_unix_secs())
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        self.lock().token.as_deref().is_some_and(|t| is_valid_at(t, now))
    }

    /// Exact match on the loaded profile's role.
    pub fn has_role(&self, role: &str) -> bool {
        self.lock().user.as_ref().is_some_and(|u| u.role == role)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        self.lock().user.as_ref().is_some_and(|u| roles.iter().any(|r| r.as_ref() == u.role))
    }

    pub(crate) fn token_store(&self) -> &TokenStore {
        &self.store
    }

    // =============================================================
    // Eviction
    // =============================================================

    /// Clear the session if it claims a credential that is no longer usable.
    ///
    /// Returns `true` when an eviction happened. An already-empty session is
    /// left alone.
    pub fn evict_if_invalid(&self) -> bool {
        self.evict_if_invalid_at(now_unix_secs())
    }

    pub(crate) fn evict_if_invalid_at(&self, now: i64) -> bool {
        let stale = {
            let inner = self.lock();
            let holds_credential = inner.token.is_some() || inner.authenticated;
            holds_credential && !inner.token.as_deref().is_some_and(|t| is_valid_at(t, now))
        };
        if stale {
            log::info!("evicting expired or malformed session token");
            self.clear();
        }
        stale
    }

    /// Reset every field and wipe the persisted keys.
    pub fn clear(&self) {
        self.store.clear();
        self.update(|inner| *inner = SessionInner::default());
    }

    // =============================================================
    // Mutators (auth client only)
    // =============================================================

    /// Start a fresh sign-in with `token`: drop any previous profile (in
    /// memory and persisted) and mark the session authenticated. A malformed
    /// token clears the session instead.
    pub(crate) fn begin(&self, token: &str) {
        if !is_well_formed(token) {
            log::warn!("refusing to hold malformed token");
            self.clear();
            return;
        }
        self.store.remove_user();
        self.update(|inner| {
            inner.token = Some(token.to_owned());
            inner.user = None;
            inner.authenticated = true;
            inner.expired_on_restore = false;
        });
    }

    /// Replace the held token for the same account (refresh). The profile is
    /// kept. A malformed token clears the session instead.
    pub(crate) fn set_token(&self, token: &str) {
        if !is_well_formed(token) {
            log::warn!("refusing to hold malformed token");
            self.clear();
            return;
        }
        self.update(|inner| inner.token = Some(token.to_owned()));
    }

    /// Install the profile fetched with `token`. Ignored (returns `false`)
    /// unless `token` is still the held token, e.g. after a logout or a new
    /// sign-in raced the fetch.
    pub(crate) fn set_user(&self, token: &str, user: UserProfile) -> bool {
        let mut applied = false;
        self.update(|inner| {
            if inner.token.as_deref() == Some(token) {
                inner.user = Some(user);
                applied = true;
            }
        });
        applied
    }

    /// Flip the authenticated flag. Raising it without a token is ignored.
    pub(crate) fn set_authenticated(&self, authenticated: bool) {
        self.update(|inner| {
            if authenticated && inner.token.is_none() {
                return;
            }
            inner.authenticated = authenticated;
        });
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.update(|inner| inner.loading = loading);
    }

    /// Whether startup discarded an expired token. Reading resets the marker.
    pub(crate) fn take_expired_on_restore(&self) -> bool {
        std::mem::take(&mut self.lock().expired_on_restore)
    }

    // =============================================================
    // Subscriptions
    // =============================================================

    /// Register `callback` to receive every changed snapshot.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, Arc::new(callback)));
        id
    }

    /// Drop a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = subs.entries.len();
        subs.entries.retain(|(sub_id, _)| *sub_id != id);
        subs.entries.len() != before
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut SessionInner),
    {
        let (before, after) = {
            let mut inner = self.lock();
            let before = inner.snapshot();
            mutate(&mut inner);
            (before, inner.snapshot())
        };
        if before != after {
            self.publish(&after);
        }
    }

    fn publish(&self, state: &AuthState) {
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(state);
        }
    }
}
