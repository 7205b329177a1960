//! Error taxonomy for the auth subsystem.
//!
//! ERROR HANDLING
//! ==============
//! Every network-facing operation returns `AuthError`. HTTP failures are
//! tagged by status so callers can tell a dead credential (401/403) from a
//! server fault, and transport failures stay distinct from both.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors produced by the auth client and its transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request never produced an HTTP response (offline, DNS, CORS).
    #[error("network request failed: {0}")]
    Transport(String),
    /// The server rejected the credential (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,
    /// The credential is valid but not allowed to do this (HTTP 403).
    #[error("forbidden")]
    Forbidden,
    /// Any other non-success HTTP status.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    /// The operation needs a token (or refresh token) and none is stored.
    #[error("no credential available")]
    MissingToken,
    /// The server handed back a token that is not a three-part signed token.
    #[error("server returned a malformed token")]
    MalformedToken,
    /// The response body did not match the expected JSON shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl AuthError {
    /// Map a non-success HTTP status and its body to a tagged error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            _ => Self::Http { status, message: server_message(body) },
        }
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means the stored credential is no longer usable.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// Short text suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Unable to reach the server. Check your connection and try again.".to_owned(),
            Self::Unauthorized => "Invalid credentials.".to_owned(),
            Self::Forbidden => "This account is not allowed to sign in.".to_owned(),
            Self::Http { status, message } if message.is_empty() => format!("Request failed ({status})."),
            Self::Http { message, .. } => message.clone(),
            Self::MissingToken => "Please sign in again.".to_owned(),
            Self::MalformedToken | Self::Decode(_) => "Unexpected response from the server.".to_owned(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"message": ".."}` or `{"error": ".."}` JSON and falls back to the
/// trimmed raw text.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.trim().to_owned();
            }
        }
    }
    body.trim().to_owned()
}
