//! Parsed PDF page collection.

use std::collections::BTreeMap;

use docmine_core::{Error, Result};
use lopdf::{Document, ObjectId};

/// A loaded PDF document.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: Document,
}

impl PdfDocument {
    pub fn new(inner: Document) -> Self {
        Self { inner }
    }

    /// Parse a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Document::load_mem(bytes)
            .map(Self::new)
            .map_err(|e| Error::PdfError(format!("Failed to parse PDF: {}", e)))
    }

    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Page object ids keyed by 1-based page number.
    pub fn pages(&self) -> BTreeMap<u32, ObjectId> {
        self.inner.get_pages()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }
}

impl From<Document> for PdfDocument {
    fn from(inner: Document) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_garbage() {
        match PdfDocument::from_bytes(b"%PDF-1.5 but nothing else") {
            Err(Error::PdfError(_)) => {}
            other => panic!("unexpected: {:?}", other.map(|d| d.page_count())),
        }
    }

    #[test]
    fn test_empty_document_has_no_pages() {
        let document = PdfDocument::new(Document::with_version("1.5"));
        assert_eq!(document.page_count(), 0);
    }
}
