//! Local storage for the persisted cart.
//!
//! Mirrors the browser `localStorage` contract: string values under string
//! keys, read and written synchronously. [`CartPersistence`] layers the cart's
//! JSON encoding on top of any [`KeyValueStorage`].
//!
//! # Backends
//!
//! - [`FileStorage`] - all keys in a single JSON object file, replaced
//!   atomically (write temp file, then rename) on every write
//! - [`MemoryStorage`] - process-local map, used by tests

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rocket_shoes_core::Cart;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored data could not be parsed.
    #[error("Corrupt storage: {0}")]
    Corrupt(String),

    /// A writer panicked while holding the storage lock.
    #[error("Storage lock poisoned")]
    Poisoned,

    /// The blocking storage task did not complete.
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// String key-value storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FileStorage
// =============================================================================

/// File-backed storage: one JSON object mapping keys to string values.
///
/// All operations are blocking filesystem calls; async callers should run
/// them on the blocking pool (see [`CartStore`](crate::cart::CartStore)).
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open storage at `path`. The file and its parent directories are
    /// created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            StorageError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), keys = map.len(), "Storage written");
        Ok(())
    }

    /// Read the current map for a write, discarding a corrupt file.
    fn read_map_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_map() {
            Err(StorageError::Corrupt(reason)) => {
                warn!(reason = %reason, "Replacing corrupt storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock()?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock()?;
        let mut map = self.read_map_for_write()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock()?;
        let mut map = self.read_map_for_write()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a raw `value` under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// CartPersistence
// =============================================================================

/// Reads and writes the cart under [`CART_STORAGE_KEY`].
#[derive(Debug)]
pub struct CartPersistence<S> {
    storage: S,
}

impl<S: KeyValueStorage> CartPersistence<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted cart.
    ///
    /// A missing key, unreadable storage or unparsable value all yield an
    /// empty cart; the failure is logged and never reaches the caller.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted cart, starting empty");
                return Cart::new();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(lines = cart.len(), "Loaded persisted cart");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Persisted cart is malformed, starting empty");
                Cart::new()
            }
        }
    }

    /// Overwrite the persisted cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns error if the cart cannot be serialized or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.storage.set(CART_STORAGE_KEY, &json)
    }

    /// Delete the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(CART_STORAGE_KEY)
    }
}
