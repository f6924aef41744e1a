use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),
}

pub type ChainResult<T> = Result<T, ChainError>;

impl ChainError {
    /// Wrap a backend error, promoting SQLite constraint failures
    pub(crate) fn storage(operation: &'static str, source: rusqlite::Error) -> Self {
        if source.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return ChainError::ConstraintViolation(format!("{operation}: {source}"));
        }
        ChainError::Storage { operation, source }
    }
}
