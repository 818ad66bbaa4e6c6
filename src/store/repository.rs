//! Repository
//!
//! Typed access to the storage medium. The `try_*` methods propagate errors;
//! `load` and `save` are best-effort: failures are logged and swallowed so
//! that the in-memory state stays the source of truth.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{KeyValueStore, StoreError};

/// Logical names of the persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Employees,
    Novelties,
    Advances,
    PayrollCalculations,
    DeductionRates,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Employees,
        StorageKey::Novelties,
        StorageKey::Advances,
        StorageKey::PayrollCalculations,
        StorageKey::DeductionRates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Employees => "employees",
            StorageKey::Novelties => "novelties",
            StorageKey::Advances => "advances",
            StorageKey::PayrollCalculations => "payrollCalculations",
            StorageKey::DeductionRates => "deductionRates",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed repository over a key-value medium
#[derive(Clone)]
pub struct Repository {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read and parse the value under `key`. `Ok(None)` when nothing is stored.
    pub fn try_load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get_item(key.as_str())? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw)?;
        Ok(Some(value))
    }

    /// Serialize and write `value` under `key`
    pub fn try_save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let raw = Self::encode(value)?;
        self.backend.set_item(key.as_str(), &raw)
    }

    /// Serialize `value` the way `try_save` stores it
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
        Ok(serde_json::to_string(value)?)
    }

    /// Best-effort load. Absent or unreadable data yields `None`, so the
    /// caller keeps its default; failures are logged, never raised.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        match self.try_load(key) {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "Loaded stored collection");
                Some(value)
            }
            Ok(None) => None,
            Err(e) if e.is_corrupt_data() => {
                tracing::warn!(key = %key, error = %e, "Stored data is corrupt, keeping default");
                None
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to load from store");
                None
            }
        }
    }

    /// Best-effort save. Returns whether the write succeeded; a failed
    /// write is logged and leaves the previously stored value in place.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        match Self::encode(value) {
            Ok(raw) => self.save_encoded(key, &raw),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to encode for store");
                false
            }
        }
    }

    /// Best-effort write of a value already produced by `encode`
    pub fn save_encoded(&self, key: StorageKey, raw: &str) -> bool {
        match self.backend.set_item(key.as_str(), raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to save to store");
                false
            }
        }
    }
}
