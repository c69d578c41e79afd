//! REST API client for the auth and user-profile endpoints.
//!
//! DESIGN
//! ======
//! `SessionApi` is the seam between the form/store and the network so both
//! can be driven by a mock in tests. `HttpSessionApi` is the real client: one
//! `reqwest::Client` with a cookie store, so the session cookie set by
//! `/login` rides along on later profile calls.
//!
//! ERROR HANDLING
//! ==============
//! Every failure comes back as an `ApiError`; callers decide how much of it
//! to show. Non-success statuses are kept apart from transport failures
//! because the store reports them with fixed messages.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use super::types::{Credentials, User};
use crate::config::ClientConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by session API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16 },

    /// The response body was not the expected JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// ENDPOINTS
// =============================================================================

pub(crate) fn login_endpoint(base_url: &str) -> String {
    format!("{base_url}/login")
}

/// `{base_url}/users/{user_id}` with `user_id` percent-encoded as a single
/// path segment.
pub(crate) fn user_endpoint(base_url: &str, user_id: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("{base_url}: cannot be a base")))?
        .pop_if_empty()
        .push("users")
        .push(user_id);
    Ok(url)
}

pub(crate) fn update_user_endpoint(base_url: &str, user_id: &str) -> Result<Url, ApiError> {
    user_endpoint(base_url, user_id)
}

// =============================================================================
// TRAIT
// =============================================================================

/// Backend operations used by the login form and the session store.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    /// Authenticate with `POST /login`; the response body is the profile.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or
    /// an undecodable body.
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;

    /// Load a profile with `GET /users/{user_id}`.
    ///
    /// # Errors
    ///
    /// See [`SessionApi::login`].
    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError>;

    /// Replace a profile with `PUT /users/{user_id}`.
    ///
    /// # Errors
    ///
    /// See [`SessionApi::login`].
    async fn update_user(&self, user_id: &str, data: &Value) -> Result<User, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSessionApi {
    /// Build a cookie-carrying client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if reqwest cannot build the client.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let response = self
            .http
            .post(login_endpoint(&self.base_url))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_user(response).await
    }

    async fn fetch_user(&self, user_id: &str) -> Result<User, ApiError> {
        let response = self
            .http
            .get(user_endpoint(&self.base_url, user_id)?)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_user(response).await
    }

    async fn update_user(&self, user_id: &str, data: &Value) -> Result<User, ApiError> {
        let response = self
            .http
            .put(update_user_endpoint(&self.base_url, user_id)?)
            .json(data)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        read_user(response).await
    }
}

async fn read_user(response: reqwest::Response) -> Result<User, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16() });
    }
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;
    parse_user(&text)
}

fn parse_user(body: &str) -> Result<User, ApiError> {
    serde_json::from_str::<User>(body).map_err(|e| ApiError::Decode(e.to_string()))
}
