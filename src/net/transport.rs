//! HTTP transport seam for the auth client.
//!
//! Browser builds (`csr`): real requests via `gloo-net`.
//! Other builds: an inert transport that fails every request, so SSR-style
//! hosts and native tests never touch the network unless they inject one.
//!
//! TRADE-OFFS
//! ==========
//! The trait is `?Send` because browser futures are not `Send`; the client
//! only ever drives it from the UI thread.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use crate::error::AuthError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request as the auth client describes it.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Bearer credential for the `Authorization` header.
    pub bearer: Option<String>,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), bearer: None, body: None }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::Post, url: url.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// `Authorization` header value, if a bearer token is attached.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// A completed HTTP exchange: status plus raw body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a 2xx body as JSON, or turn a non-2xx status into an error.
    ///
    /// # Errors
    ///
    /// Returns the status-tagged [`AuthError`] for non-2xx responses and
    /// [`AuthError::Decode`] when the body does not match `T`.
    pub fn into_json<T: serde::de::DeserializeOwned>(self) -> Result<T, AuthError> {
        if !self.is_success() {
            return Err(AuthError::from_status(self.status, &self.body));
        }
        serde_json::from_str(&self.body).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Check the status and discard the body.
    ///
    /// # Errors
    ///
    /// Returns the status-tagged [`AuthError`] for non-2xx responses.
    pub fn into_unit(self) -> Result<(), AuthError> {
        if self.is_success() { Ok(()) } else { Err(AuthError::from_status(self.status, &self.body)) }
    }
}

/// Something that can execute an [`HttpRequest`].
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    /// Perform the request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Transport`] when no response was received. HTTP
    /// error statuses are NOT errors at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError>;
}

/// Transport backed by the browser `fetch` API.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[cfg(feature = "csr")]
#[async_trait::async_trait(?Send)]
impl HttpTransport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        use gloo_net::http::Request;

        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        if let Some(value) = request.authorization() {
            builder = builder.header("Authorization", &value);
        }
        let prepared = match &request.body {
            Some(body) => builder.json(body).map_err(|e| AuthError::Transport(e.to_string()))?,
            None => builder.build().map_err(|e| AuthError::Transport(e.to_string()))?,
        };
        let resp = prepared.send().await.map_err(|e| AuthError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(not(feature = "csr"))]
#[async_trait::async_trait(?Send)]
impl HttpTransport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        Err(AuthError::Transport(format!("no browser transport for {}", request.url)))
    }
}
