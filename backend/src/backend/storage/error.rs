//! Errors raised by the storage layer.

use std::path::PathBuf;

use crate::backend::domain::models::TransactionId;

/// Failure of a storage operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A positional index no longer addresses a record, usually because the
    /// caller's listing is stale
    #[error("Index {index} is out of range (collection holds {len} transactions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize transactions: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
