//! Storage sinks for extraction results.
//!
//! A [`Sink`] persists one document's [`ExtractionResult`] under a document
//! identifier: [`FileSink`] as a directory of text and CSV files,
//! [`SqlSink`] as rows across a fixed SQLite schema.

pub mod error;
pub mod file;
pub mod sql;

use docmine_core::ExtractionResult;

pub use error::{Result, StorageError};
pub use file::FileSink;
pub use sql::SqlSink;

/// Persists extraction results.
pub trait Sink {
    /// Save one document's result under `file_name`.
    fn save(&mut self, result: &ExtractionResult, file_name: &str) -> Result<()>;
}
