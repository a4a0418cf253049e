//! Error types for quarantine-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for quarantine operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Path \"{}\" is unreachable", path.display())]
    PathUnreachable { path: PathBuf },

    #[error("Failed to write quarantine attribute on \"{}\"", path.display())]
    AttributeWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read quarantine attribute on \"{}\"", path.display())]
    AttributeReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to get value for key {0} from quarantine properties")]
    InfoKeyNotFound(String),

    #[error("Malformed quarantine attribute: {0}")]
    MalformedAttribute(String),

    #[error("Invalid quarantine record: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quarantine events database errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),

    #[error("Invalid event row: {0}")]
    InvalidRow(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(StorageError::Database(err.to_string()))
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
