//! Local cache helper
//!
//! Best-effort JSON mirror of the last successful server responses. Reads
//! fall back to a default on absence, storage failure or corrupt JSON; writes
//! swallow failures. The cache is never the source of truth.

mod storage;

pub use storage::{MemoryStorage, RedbStorage, Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Cache key for the category list
pub const CATEGORIES_KEY: &str = "categories";
/// Cache key for the available menu items
pub const MENU_ITEMS_KEY: &str = "menuItemsVisible";
/// Cache key for the reservation list
pub const RESERVATIONS_KEY: &str = "reservations";
/// Cache key for a persisted auth session
pub const SESSION_KEY: &str = "session";

/// JSON cache over a [`Storage`]
#[derive(Clone)]
pub struct LocalCache {
    storage: Arc<dyn Storage>,
}

impl LocalCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Cache backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Cache backed by a redb file. Falls back to memory if the file cannot
    /// be opened.
    pub fn open_or_memory(path: impl AsRef<Path>) -> Self {
        match RedbStorage::open(path.as_ref()) {
            Ok(storage) => Self::new(Arc::new(storage)),
            Err(e) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "Cache file unavailable, using in-memory cache"
                );
                Self::in_memory()
            }
        }
    }

    /// Read and parse `key`, or `default` if absent/unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding corrupt cache entry");
                default
            }
        }
    }

    /// Serialize and store `value` under `key`. Failures are logged only.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache value not serializable");
                return;
            }
        };
        if let Err(e) = self.storage.set(key, &raw) {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }

    /// Remove `key`. Failures are logged only.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "Cache remove failed");
        }
    }

    /// Raw JSON text stored under `key`, for inspection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.storage.get(key).ok().flatten()
    }

    /// Whether entries survive a restart (false for memory and fallback caches)
    pub fn is_persistent(&self) -> bool {
        self.storage.is_persistent()
    }

    /// Stored keys (empty on failure)
    pub fn keys(&self) -> Vec<String> {
        self.storage.keys().unwrap_or_default()
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::in_memory()
    }
}
