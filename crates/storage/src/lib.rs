#![forbid(unsafe_code)]

pub mod credentials;
pub mod repository;
pub mod session_cache;
pub mod sqlite;

pub use credentials::CredentialStore;
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use session_cache::SessionCache;
