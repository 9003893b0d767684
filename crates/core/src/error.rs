//! Error types for office document extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::DocumentFormat;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or normalizing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The source path does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file extension matches none of the supported formats.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The parser could not open a file with a recognized extension.
    #[error("Failed to open {format}: {reason}")]
    LoadFailed {
        format: DocumentFormat,
        reason: String,
    },

    /// Failed to walk the PDF object tree.
    #[error("PDF error: {0}")]
    PdfError(String),

    /// ZIP archive error (for DOCX and PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for DOCX and PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Failed to decode or encode an image payload.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Failed to write or read a table CSV.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Failed to extract content from the parsed document.
    #[error("Extraction error: {0}")]
    ExtractionError(String),
}

impl Error {
    /// Wrap a parser failure for the given format.
    pub fn load_failed(format: DocumentFormat, reason: impl ToString) -> Self {
        Self::LoadFailed {
            format,
            reason: reason.to_string(),
        }
    }
}
