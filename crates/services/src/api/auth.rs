use reqwest::Method;
use tracing::{info, warn};

use virtuatest_core::model::{
    LoginResponse, MessageResponse, RegisterRequest, RegisterResponse, UserProfile,
};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Exchange email and password for a token (`POST /auth/login`,
    /// form-encoded). On success the token and profile are stored before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the credentials cannot be
    /// stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .anonymous(Method::POST, "/auth/login")
            .form(&[("username", email), ("password", password)]);
        let response: LoginResponse = self.send(request, "Login failed").await?;

        self.credentials()
            .save(&response.clone().into_credentials())
            .await?;
        info!(user_id = %response.user_id, "logged in");
        Ok(response)
    }

    /// Create an account (`POST /auth/register`, JSON). The backend may
    /// require the emailed one-time code as `otp_code`. On success the new
    /// token and a student profile are stored before returning.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the credentials cannot be
    /// stored.
    pub async fn register(
        &self,
        request: &RegisterRequest,
        otp_code: Option<&str>,
    ) -> Result<RegisterResponse, ApiError> {
        let mut builder = self.anonymous(Method::POST, "/auth/register").json(request);
        if let Some(code) = otp_code {
            builder = builder.query(&[("otp_code", code)]);
        }
        let response: RegisterResponse = self.send(builder, "Registration failed").await?;

        let credentials = response
            .clone()
            .into_credentials(request.full_name.clone());
        self.credentials().save(&credentials).await?;
        info!(user_id = %response.user_id, "registered");
        Ok(response)
    }

    /// Ask the backend to email a verification code.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn request_otp(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let request = self
            .anonymous(Method::POST, "/auth/request-otp")
            .query(&[("email", email)]);
        self.send(request, "Could not send verification code").await
    }

    /// Check a verification code before registering.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the code is rejected.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<MessageResponse, ApiError> {
        let request = self
            .anonymous(Method::POST, "/auth/verify-otp")
            .query(&[("email", email), ("code", code)]);
        self.send(request, "Verification failed").await
    }

    /// Profile of the token's owner (`GET /auth/me`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let request = self.authorized(Method::GET, "/auth/me").await?;
        self.send(request, "Failed to load profile").await
    }

    /// Sign out locally. The backend is notified on a best-effort basis;
    /// token, profile and cached session are cleared regardless.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if local state cannot be cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.authorized(Method::POST, "/auth/logout").await {
            Ok(request) => {
                if let Err(err) = self
                    .send::<MessageResponse>(request, "Logout failed")
                    .await
                {
                    warn!(error = %err, "backend logout failed");
                }
            }
            Err(err) => warn!(error = %err, "could not build logout request"),
        }

        self.credentials().clear().await?;
        self.session_cache().clear().await?;
        info!("logged out");
        Ok(())
    }
}
