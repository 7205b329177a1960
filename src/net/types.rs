//! Wire DTOs for the auth endpoints and the normalized user profile.
//!
//! DESIGN
//! ======
//! `RawUser` mirrors the loosely-typed `/user/me` payload (every field
//! optional, ids as strings or numbers). `UserProfile` is the normalized form
//! the rest of the client works with and the form persisted to storage.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Role assigned to a user when the payload carries none.
pub const DEFAULT_ROLE: &str = "USER";

/// Body of `POST /auth/signin`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignInRequest {
    /// Login identifier: an email address or a phone number.
    pub email: String,
    pub password: String,
}

/// Token pair returned by sign-in and refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Body of `POST /auth/refresh`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of `POST /auth/password/reset`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Fixed role vocabulary used by route declarations.
///
/// Profiles keep the role as the raw string the server sent; matching is by
/// exact equality against [`Role::as_str`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    /// Design office (bureau d'études techniques).
    Bet,
    Supplier,
    SiteManager,
    Subcontractor,
    Promoter,
    User,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Bet,
        Role::Supplier,
        Role::SiteManager,
        Role::Subcontractor,
        Role::Promoter,
        Role::User,
    ];

    /// Wire spelling of the role tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Bet => "BET",
            Role::Supplier => "SUPPLIER",
            Role::SiteManager => "SITE_MANAGER",
            Role::Subcontractor => "SUBCONTRACTOR",
            Role::Promoter => "PROMOTER",
            Role::User => "USER",
        }
    }

    /// Look up a role by its exact wire spelling.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == tag)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user as the client tracks and persists it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone: String,
    pub address: String,
    /// Role tag, e.g. `"ADMIN"` or `"SITE_MANAGER"`.
    pub role: String,
    pub activated: bool,
    pub photo_url: Option<String>,
    pub funds: f64,
    pub note: f64,
}

impl UserProfile {
    /// "First Last", skipping empty parts.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() { self.email.clone() } else { full.to_owned() }
    }
}

/// Raw `/user/me` payload before normalization.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "firstname", alias = "prenom")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastname", alias = "nom")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phone")]
    pub telephone: Option<String>,
    #[serde(default, alias = "adresse")]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub activated: Option<bool>,
    #[serde(default, alias = "photo")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub funds: Option<f64>,
    #[serde(default)]
    pub note: Option<f64>,
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            first_name: raw.first_name.unwrap_or_default(),
            last_name: raw.last_name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            telephone: raw.telephone.unwrap_or_default(),
            address: raw.address.unwrap_or_default(),
            role: raw
                .role
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_owned()),
            activated: raw.activated.unwrap_or(false),
            photo_url: raw.photo_url.filter(|p| !p.is_empty()),
            funds: raw.funds.unwrap_or(0.0),
            note: raw.note.unwrap_or(0.0),
        }
    }
}

/// Accept ids sent as either JSON strings or integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!("expected string or integer id, got {other}"))),
    }
}
