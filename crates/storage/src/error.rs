//! Error types for storage sinks.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while persisting an extraction result.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create a directory or write a file.
    #[error("Failed to write file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to write a CSV file.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A statement failed; the document's transaction was rolled back.
    #[error("Database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// Failed to encode table data as JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
