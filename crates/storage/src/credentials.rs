//! Token and cached profile of the signed-in user.

use std::sync::Arc;

use tracing::debug;
use virtuatest_core::model::{AccessToken, Credentials, UserProfile};

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the raw bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the JSON-encoded `UserProfile`.
pub const USER_KEY: &str = "user";

/// Reads and writes credentials in a `KeyValueStore`.
///
/// The token is not inspected: any non-empty stored string counts as a
/// signed-in state, expired or not.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn token(&self) -> Result<Option<AccessToken>, StorageError> {
        Ok(self.kv.get(ACCESS_TOKEN_KEY).await?.map(AccessToken::new))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be stored.
    pub async fn set_token(&self, token: &AccessToken) -> Result<(), StorageError> {
        self.kv.set(ACCESS_TOKEN_KEY, token.as_str()).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn remove_token(&self) -> Result<(), StorageError> {
        self.kv.remove(ACCESS_TOKEN_KEY).await
    }

    /// Cached profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored profile is not
    /// valid JSON, or other storage errors.
    pub async fn user(&self) -> Result<Option<UserProfile>, StorageError> {
        match self.kv.get(USER_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be encoded or stored.
    pub async fn set_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.kv.set(USER_KEY, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn remove_user(&self) -> Result<(), StorageError> {
        self.kv.remove(USER_KEY).await
    }

    /// Persist token then profile. A failure after the token write leaves
    /// the two keys out of sync.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either write fails.
    pub async fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.set_token(&credentials.token).await?;
        self.set_user(&credentials.user).await?;
        debug!(user_id = %credentials.user.id, "stored credentials");
        Ok(())
    }

    /// Both halves, when both are present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either key cannot be read or decoded.
    pub async fn load(&self) -> Result<Option<Credentials>, StorageError> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };
        let Some(user) = self.user().await? else {
            return Ok(None);
        };
        Ok(Some(Credentials::new(token, user)))
    }

    /// Remove token and profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.remove_token().await?;
        self.remove_user().await?;
        debug!("cleared credentials");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, StorageError> {
        Ok(self.token().await?.is_some_and(|token| !token.is_empty()))
    }
}
