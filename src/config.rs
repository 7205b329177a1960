//! Client configuration resolved at build time.
//!
//! The browser bundle has no process environment, so values are baked in
//! with `option_env!` when the crate is compiled. Tests and other hosts go
//! through [`ClientConfig::from_lookup`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const API_URL_VAR: &str = "CHANTIER_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "/api";
pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PATH: &str = "/";

/// Errors produced while resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The API base is neither an absolute `http(s)` URL nor a rooted path.
    #[error("{var} must be an http(s) URL or start with '/', got '{value}'")]
    InvalidApiUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every auth endpoint is joined onto, without trailing `/`.
    pub api_base_url: String,
    /// Route the guard sends unauthenticated visitors to.
    pub login_path: String,
    /// Landing route for role denials and post-login fallbacks.
    pub default_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            login_path: LOGIN_PATH.to_owned(),
            default_path: DEFAULT_PATH.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build config from an arbitrary key lookup.
    ///
    /// Optional:
    /// - `CHANTIER_API_URL`: default `/api`
    ///
    /// Route paths are fixed by the router and always take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] for a base that is neither an
    /// absolute `http(s)` URL nor a rooted path.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = match lookup(API_URL_VAR).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
            Some(raw) => parse_api_url(&raw)?,
            None => DEFAULT_API_BASE_URL.to_owned(),
        };
        Ok(Self { api_base_url, ..Self::default() })
    }

    /// Build config from values captured at compile time.
    ///
    /// Falls back to defaults (with a warning) if the baked-in values are
    /// invalid, since the bundle has no way to report a startup error.
    pub fn from_build_env() -> Self {
        let resolved = Self::from_lookup(|key| {
            let baked = match key {
                API_URL_VAR => option_env!("CHANTIER_API_URL"),
                _ => None,
            };
            baked.map(str::to_owned)
        });
        match resolved {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring build-time config: {e}");
                Self::default()
            }
        }
    }

    /// Join an endpoint path onto the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_end_matches('/');
    if raw.starts_with('/') && !raw.starts_with("//") {
        return Ok(trimmed.to_owned());
    }
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(trimmed.to_owned()),
        _ => Err(ConfigError::InvalidApiUrl { var: API_URL_VAR, value: raw.to_owned() }),
    }
}
