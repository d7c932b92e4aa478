use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Stored record bytes could not be decoded.
    #[error("Corrupt record: {0}")]
    CorruptRecord(#[source] serde_json::Error),

    /// A record that cannot be encoded (e.g. a non-finite rating).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some files of a save were not written. Files that were written stay on disk.
    #[error("Incomplete save at {}: failed to write {}", location.display(), failed.join(", "))]
    IncompleteSave {
        location: PathBuf,
        failed: Vec<String>,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
