//! REST client for the auth endpoints.
//!
//! The only code in the crate that talks to the network about credentials.
//! Each operation shapes its request, runs it through the injected
//! [`HttpTransport`], and applies the result to the shared [`Session`].
//!
//! ERROR HANDLING
//! ==============
//! HTTP errors are never swallowed: they come back to the caller as
//! [`AuthError`]. The one side effect attached to an error is session
//! teardown when the profile or refresh endpoint reports 401/403.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use super::transport::{HttpRequest, HttpResponse, HttpTransport};
use super::types::{PasswordResetRequest, RawUser, RefreshRequest, SignInRequest, SignInResponse, UserProfile};
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::state::session::Session;
use crate::util::token::is_well_formed;

pub const SIGN_IN_PATH: &str = "auth/signin";
pub const REFRESH_PATH: &str = "auth/refresh";
pub const CURRENT_USER_PATH: &str = "user/me";
pub const PASSWORD_RESET_PATH: &str = "auth/password/reset";

fn to_body<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value, AuthError> {
    serde_json::to_value(payload).map_err(|e| AuthError::Decode(e.to_string()))
}

#[derive(Clone)]
pub struct AuthClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport + Send + Sync>,
    session: Session,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport + Send + Sync>, session: Session) -> Self {
        Self { config: Arc::new(config), transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign in with `email` (or phone number) and `password`.
    ///
    /// On success both tokens are persisted, any profile from an earlier
    /// sign-in is dropped, and the session becomes authenticated. The
    /// profile is NOT loaded; chain
    /// [`fetch_current_user`](Self::fetch_current_user) for that.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP errors unchanged, leaving the session
    /// untouched. Returns [`AuthError::MalformedToken`] if the server's token
    /// is not a three-part token.
    pub async fn login(&self, email: &str, password: &str) -> Result<SignInResponse, AuthError> {
        let body = to_body(&SignInRequest { email: email.to_owned(), password: password.to_owned() })?;
        let request = HttpRequest::post(self.config.endpoint(SIGN_IN_PATH), body);
        let pair: SignInResponse = self.transport.send(request).await?.into_json()?;
        ensure_well_formed(&pair)?;
        self.session.token_store().save(&pair.token, &pair.refresh_token);
        self.session.begin(&pair.token);
        log::info!("signed in");
        Ok(pair)
    }

    /// Load the profile for the held token and install it in the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] without any network I/O when no
    /// token is held. A 401/403 clears the session before the error is
    /// returned; other errors leave the session as it was.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, AuthError> {
        let token = self.session.token().ok_or(AuthError::MissingToken)?;
        self.session.set_loading(true);
        let result = self.request_current_user(&token).await;
        self.session.set_loading(false);

        match result {
            Ok(user) => {
                if self.session.set_user(&token, user.clone()) {
                    self.session.token_store().save_user(&user);
                } else {
                    log::debug!("session ended while the profile was loading");
                }
                Ok(user)
            }
            Err(e) => {
                if e.is_session_fatal() {
                    log::info!("profile fetch rejected ({e}); clearing session");
                    self.session.clear();
                }
                Err(e)
            }
        }
    }

    async fn request_current_user(&self, token: &str) -> Result<UserProfile, AuthError> {
        let request = HttpRequest::get(self.config.endpoint(CURRENT_USER_PATH)).with_bearer(token);
        let raw: RawUser = self.transport.send(request).await?.into_json()?;
        Ok(UserProfile::from(raw))
    }

    /// Ask the backend to send a password reset for `email`.
    ///
    /// # Errors
    ///
    /// Propagates transport and HTTP errors. Never touches the session.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let body = to_body(&PasswordResetRequest { email: email.to_owned() })?;
        let request = HttpRequest::post(self.config.endpoint(PASSWORD_RESET_PATH), body);
        self.transport.send(request).await?.into_unit()
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingToken`] when no refresh token is stored.
    /// A 401/403 clears the session before the error is returned.
    pub async fn refresh(&self) -> Result<SignInResponse, AuthError> {
        let refresh_token = self
            .session
            .token_store()
            .read_refresh_token()
            .ok_or(AuthError::MissingToken)?;
        let body = to_body(&RefreshRequest { refresh_token })?;
        let request = HttpRequest::post(self.config.endpoint(REFRESH_PATH), body);

        let result = self.transport.send(request).await.and_then(HttpResponse::into_json::<SignInResponse>);
        match result {
            Ok(pair) => {
                ensure_well_formed(&pair)?;
                self.session.token_store().save(&pair.token, &pair.refresh_token);
                self.session.set_token(&pair.token);
                log::info!("session token refreshed");
                Ok(pair)
            }
            Err(e) => {
                if e.is_session_fatal() {
                    log::info!("refresh rejected ({e}); clearing session");
                    self.session.clear();
                }
                Err(e)
            }
        }
    }

    /// Load the profile once at startup when storage held a token but no
    /// usable cached profile.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_current_user`](Self::fetch_current_user).
    pub async fn restore_profile(&self) -> Result<Option<UserProfile>, AuthError> {
        if !self.session.state().awaiting_profile() {
            return Ok(None);
        }
        self.fetch_current_user().await.map(Some)
    }

    /// End the session locally. No request is made.
    pub fn logout(&self) {
        self.session.clear();
        log::info!("signed out");
    }
}

fn ensure_well_formed(pair: &SignInResponse) -> Result<(), AuthError> {
    if is_well_formed(&pair.token) {
        Ok(())
    } else {
        log::warn!("server returned a malformed token");
        Err(AuthError::MalformedToken)
    }
}
