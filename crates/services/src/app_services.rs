use std::sync::Arc;

use storage::repository::Storage;

use crate::api::{ApiClient, ApiConfig};
use crate::error::AppServicesError;

/// Assembles the storage backend and the API client that reads from it.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    api: Arc<ApiClient>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, config: ApiConfig) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, config))
    }

    /// Services over volatile storage; nothing survives a restart.
    #[must_use]
    pub fn in_memory(config: ApiConfig) -> Self {
        Self::from_storage(Storage::in_memory(), config)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, config: ApiConfig) -> Self {
        let api = Arc::new(ApiClient::new(
            config,
            storage.credentials(),
            storage.session_cache(),
        ));
        Self { storage, api }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api)
    }
}
