//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::AuthError;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::net::types::UserProfile;
use crate::state::session::Session;
use crate::state::token_store::TokenStore;
use crate::util::storage::MemoryStore;
use crate::util::token::now_unix_secs;

/// Build an unsigned three-part token carrying the given payload claims.
pub fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

/// Token expiring `secs` seconds from now (negative for the past).
pub fn token_expiring_in(secs: i64) -> String {
    make_token(&serde_json::json!({ "sub": "u-1", "exp": now_unix_secs() + secs }))
}

/// Token good for a day.
pub fn fresh_token() -> String {
    token_expiring_in(24 * 60 * 60)
}

pub fn sample_user(role: &str) -> UserProfile {
    UserProfile {
        id: "u-1".to_owned(),
        first_name: "Moussa".to_owned(),
        last_name: "Ndiaye".to_owned(),
        email: "moussa@example.sn".to_owned(),
        telephone: "771234567".to_owned(),
        address: "Thiès".to_owned(),
        role: role.to_owned(),
        activated: true,
        photo_url: None,
        funds: 0.0,
        note: 0.0,
    }
}

/// Session over a fresh in-memory store; the store handle is returned for
/// inspection.
pub fn memory_session() -> (Session, MemoryStore) {
    let backend = MemoryStore::new();
    let session = Session::new(TokenStore::new(Arc::new(backend.clone())));
    (session, backend)
}

/// Transport that replays canned responses in order and records requests.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, AuthError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.push(Ok(HttpResponse { status, body: body.to_string() }));
        self
    }

    #[must_use]
    pub fn fail(self, error: AuthError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<HttpResponse, AuthError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        let url = request.url.clone();
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Transport(format!("no canned response for {url}"))))
    }
}
