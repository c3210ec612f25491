use std::sync::Arc;

use virtuatest_core::model::TestSession;

use crate::repository::{KeyValueStore, StorageError};

/// Key holding the JSON-encoded active test session.
pub const CURRENT_SESSION_KEY: &str = "current_session";

/// Remembers the payload of the last "start test" call so module calls can
/// reference its id. No expiry or merging.
#[derive(Clone)]
pub struct SessionCache {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Replace the cached session with `session`, stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be encoded or stored.
    pub async fn store(&self, session: &TestSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.kv.set(CURRENT_SESSION_KEY, &raw).await
    }

    /// The cached session, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value does not
    /// parse, or other storage errors.
    pub async fn load(&self) -> Result<Option<TestSession>, StorageError> {
        match self.kv.get(CURRENT_SESSION_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(CURRENT_SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn load_without_store_is_none() {
        let cache = SessionCache::new(Arc::new(InMemoryStore::new()));
        assert_eq!(cache.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stores_payload_verbatim() {
        let kv = Arc::new(InMemoryStore::new());
        let cache = SessionCache::new(kv.clone());
        let payload = json!({"id": 8, "student_id": 2, "completed_modules": []});
        let session: TestSession = serde_json::from_value(payload.clone()).unwrap();

        cache.store(&session).await.unwrap();

        let raw = kv.get(CURRENT_SESSION_KEY).await.unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, payload);
        assert_eq!(cache.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn clear_forgets_session() {
        let cache = SessionCache::new(Arc::new(InMemoryStore::new()));
        let session: TestSession = serde_json::from_value(json!({"session_id": 1})).unwrap();
        cache.store(&session).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.load().await.unwrap(), None);
    }
}
