use std::env;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use storage::{CredentialStore, SessionCache};
use virtuatest_core::model::{Credentials, ErrorBody, TestSession, UserProfile};

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Sent in place of a token when none is stored. The backend rejects it.
const MISSING_TOKEN: &str = "null";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Parse and normalize a base URL (trailing slashes removed).
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let trimmed = raw.trim();
        Url::parse(trimmed)?;
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_owned(),
        })
    }

    /// `VIRTUATEST_API_URL`, or the local development backend.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the variable holds an invalid URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let raw = env::var("VIRTUATEST_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        Self::parse(&raw)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_owned(),
        }
    }
}

/// Client for the assessment backend.
///
/// Reads the bearer token from the credential store on every call. Login,
/// registration and test start write their results back; nothing is
/// written when a call fails.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    credentials: CredentialStore,
    sessions: SessionCache,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig, credentials: CredentialStore, sessions: SessionCache) -> Self {
        Self {
            http: Client::new(),
            config,
            credentials,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    #[must_use]
    pub fn session_cache(&self) -> &SessionCache {
        &self.sessions
    }

    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the credential store cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.credentials.is_logged_in().await?)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the cached profile cannot be read.
    pub async fn current_user(&self) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.credentials.user().await?)
    }

    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the credential store cannot be read.
    pub async fn current_credentials(&self) -> Result<Option<Credentials>, ApiError> {
        Ok(self.credentials.load().await?)
    }

    /// The session returned by the last successful `start_test`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the session cache cannot be read.
    pub async fn current_session(&self) -> Result<Option<TestSession>, ApiError> {
        Ok(self.sessions.load().await?)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Request without credentials (login, registration).
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        self.http.request(method, self.url(path))
    }

    /// Request carrying `Authorization: Bearer <token>`.
    pub(crate) async fn authorized(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ApiError> {
        let token = self
            .credentials
            .token()
            .await?
            .filter(|token| !token.is_empty());
        let bearer = token
            .as_ref()
            .map_or(MISSING_TOKEN, |token| token.as_str());
        debug!(%method, path, has_token = token.is_some(), "api request");
        Ok(self
            .http
            .request(method, self.url(path))
            .header(AUTHORIZATION, format!("Bearer {bearer}")))
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        read_json(response, fallback).await
    }

    /// Like `send`, but a 403 becomes `ApiError::Unauthorized`.
    pub(crate) async fn send_admin<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        if response.status() == StatusCode::FORBIDDEN {
            warn!(url = %response.url(), "admin request refused");
            return Err(ApiError::Unauthorized);
        }
        read_json(response, fallback).await
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    fallback: &'static str,
) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let url = response.url().clone();
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    let detail = body.message();
    warn!(%status, %url, detail = detail.as_deref().unwrap_or(""), "api request failed");
    Err(ApiError::rejected(status, detail, fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slashes() {
        let config = ApiConfig::parse(" https://exam.example.com/api/// ").unwrap();
        assert_eq!(config.base_url, "https://exam.example.com/api");
    }

    #[test]
    fn config_rejects_relative_urls() {
        assert!(ApiConfig::parse("/api").is_err());
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ApiConfig::default().base_url, DEFAULT_API_URL);
    }
}
