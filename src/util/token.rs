//! Bearer token structure and expiry checks.
//!
//! The client never verifies signatures; it only needs to know whether a
//! token is shaped like `header.payload.signature` and whether its `exp`
//! claim is still comfortably in the future.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Tokens are treated as expired this many seconds before their `exp`.
pub const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Claims the client reads from a token payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenClaims {
    /// Expiration as seconds since the Unix epoch.
    pub exp: Option<i64>,
    /// Subject (user identifier), if present.
    pub sub: Option<String>,
}

/// Whether `token` splits into exactly three non-empty dot-separated parts.
pub fn is_well_formed(token: &str) -> bool {
    let mut parts = 0usize;
    for segment in token.split('.') {
        if segment.is_empty() {
            return false;
        }
        parts += 1;
    }
    parts == 3
}

/// Decode the payload claims of a well-formed token.
///
/// Returns `None` when the token is malformed or its payload is not
/// base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    if !is_well_formed(token) {
        return None;
    }
    let payload = token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("token payload is not base64url: {e}");
            return None;
        }
    };
    let value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("token payload is not JSON: {e}");
            return None;
        }
    };
    Some(TokenClaims {
        exp: value.get("exp").and_then(claim_as_secs),
        sub: value.get("sub").and_then(serde_json::Value::as_str).map(str::to_owned),
    })
}

/// Whether `token` is usable at `now` (seconds since the Unix epoch).
///
/// A token is valid when it is well formed, its payload decodes, and its
/// `exp` (if any) is more than [`EXPIRY_MARGIN_SECS`] after `now`.
pub fn is_valid_at(token: &str, now: i64) -> bool {
    let Some(claims) = decode_claims(token) else {
        return false;
    };
    claims.exp.is_none_or(|exp| exp - EXPIRY_MARGIN_SECS > now)
}

/// Current wall-clock time in seconds since the Unix epoch.
#[cfg(feature = "csr")]
#[allow(clippy::cast_possible_truncation)]
pub fn now_unix_secs() -> i64 {
    (js_sys::Date::now() / 1000.0).floor() as i64
}

/// Current wall-clock time in seconds since the Unix epoch.
#[cfg(not(feature = "csr"))]
pub fn now_unix_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn claim_as_secs(value: &serde_json::Value) -> Option<i64> {
    if let Some(int) = value.as_i64() {
        return Some(int);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f.floor() as i64)
}
