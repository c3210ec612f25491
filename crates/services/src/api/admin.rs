use reqwest::Method;

use virtuatest_core::model::{
    AdminReport, AdminStats, AdminUser, ConfigUpdate, MessageResponse, NewUser, TestConfig,
    UserId, UserUpdate,
};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        let request = self.authorized(Method::GET, "/admin/stats").await?;
        self.send_admin(request, "Failed to load statistics").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        let request = self.authorized(Method::GET, "/admin/users").await?;
        self.send_admin(request, "Failed to load users").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_create_user(&self, user: &NewUser) -> Result<MessageResponse, ApiError> {
        let request = self
            .authorized(Method::POST, "/admin/users")
            .await?
            .json(user);
        self.send_admin(request, "Failed to create user").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_update_user(
        &self,
        user_id: UserId,
        update: &UserUpdate,
    ) -> Result<MessageResponse, ApiError> {
        let path = format!("/admin/users/{user_id}");
        let request = self.authorized(Method::PUT, &path).await?.json(update);
        self.send_admin(request, "Failed to update user").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_config(&self) -> Result<TestConfig, ApiError> {
        let request = self.authorized(Method::GET, "/admin/config").await?;
        self.send_admin(request, "Failed to load configuration").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_update_config(
        &self,
        update: &ConfigUpdate,
    ) -> Result<MessageResponse, ApiError> {
        let request = self
            .authorized(Method::PUT, "/admin/config")
            .await?
            .json(update);
        self.send_admin(request, "Failed to save configuration").await
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admins, or other `ApiError`s.
    pub async fn admin_reports(&self) -> Result<Vec<AdminReport>, ApiError> {
        let request = self.authorized(Method::GET, "/admin/reports").await?;
        self.send_admin(request, "Failed to load reports").await
    }
}
