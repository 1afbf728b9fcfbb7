//! Durable client storage.
//!
//! Stores persist one JSON value under a fixed key, the way a browser keeps
//! state in local storage. [`Storage`] is the seam; [`MemoryStorage`] backs
//! tests and embedded use, the CLI ships a file-backed implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys for persisted state.
pub mod keys {
    /// Key holding the authenticated admin.
    pub const ADMIN_USER: &str = "adminUser";

    /// Key holding the cart line list.
    pub const CART: &str = "cart";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or device failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is not usable (e.g. a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or saving a JSON value.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored value could not be decoded.
    #[error("corrupt value under {key:?}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be encoded.
    #[error("failed to encode value for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key/value store.
pub trait Storage {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(f(&mut entries))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

/// Load and decode the JSON value under `key`.
///
/// # Errors
///
/// Returns [`PersistError::Corrupt`] if the value is not valid JSON for `T`,
/// or [`PersistError::Storage`] if the backend fails.
pub fn load_json<T, S>(storage: &S, key: &str) -> Result<Option<T>, PersistError>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistError::Corrupt {
            key: key.to_owned(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding or the backend write fails.
pub fn save_json<T, S>(storage: &S, key: &str, value: &T) -> Result<(), PersistError>
where
    T: Serialize + ?Sized,
    S: Storage + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| PersistError::Encode {
        key: key.to_owned(),
        source,
    })?;
    storage.set(key, &raw)?;
    tracing::trace!(key, bytes = raw.len(), "Persisted value");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        other.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        assert!(MemoryStorage::new().remove("nothing").is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let storage = MemoryStorage::new();
        save_json(&storage, keys::CART, &vec![1, 2, 3]).unwrap();
        let loaded: Option<Vec<u32>> = load_json(&storage, keys::CART).unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_load_missing_is_none() {
        let loaded: Option<Vec<u32>> = load_json(&MemoryStorage::new(), keys::CART).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_corrupt_value() {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, "{not json").unwrap();
        let err = load_json::<Vec<u32>, _>(&storage, keys::CART).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { ref key, .. } if key == "cart"));
    }
}
