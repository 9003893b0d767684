//! Loader and extraction strategy traits shared by every format backend.

use std::path::Path;

use crate::error::Result;
use crate::types::{
    DocumentFormat, ExtractedImage, ExtractedTable, ExtractionResult, Link, TextExtraction,
};

/// Validates a source path and opens it into a format-specific document handle.
pub trait Loader {
    /// Parsed document handle produced by this loader.
    type Document;

    /// Path of the file this loader opens.
    fn path(&self) -> &Path;

    /// Format this loader understands.
    fn format(&self) -> DocumentFormat;

    /// Check if the file exists on disk.
    fn validate(&self) -> bool {
        self.path().is_file()
    }

    /// Validate and parse the file.
    fn load(&self) -> Result<Self::Document>;
}

/// Per-format strategy mapping a parsed document into the unified model.
///
/// Every operation walks the document independently. Image and table passes
/// write their assets to deterministic paths, so repeated calls overwrite the
/// same files.
pub trait Extractor {
    /// Text fragments per page, with headings and font runs.
    fn extract_text(&self) -> Result<TextExtraction>;

    /// Hyperlinks in document order.
    fn extract_links(&self) -> Result<Vec<Link>>;

    /// Embedded images, written to the images directory.
    fn extract_images(&self) -> Result<Vec<ExtractedImage>>;

    /// Tables, each written to its own CSV file.
    fn extract_tables(&self) -> Result<Vec<ExtractedTable>>;

    /// Run all four passes and assemble the result.
    fn extract_all(&self) -> Result<ExtractionResult> {
        let text = self.extract_text()?;
        let links = self.extract_links()?;
        let images = self.extract_images()?;
        let tables = self.extract_tables()?;

        Ok(ExtractionResult::from_parts(text, links, images, tables))
    }
}
