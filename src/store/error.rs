//! Store Errors
//!
//! Error types for storage operations.

use std::path::PathBuf;

/// Errors that can occur reading or writing the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error on the backing medium
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored value does not parse as the expected record shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The medium refused the write
    #[error("Write rejected for key {0}")]
    WriteRejected(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the stored data itself is bad (as opposed to the medium)
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, StoreError::Serialization(_))
    }
}
