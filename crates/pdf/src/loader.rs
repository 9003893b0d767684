//! PDF loader.

use std::path::{Path, PathBuf};

use docmine_core::{DocumentFormat, Error, Loader, Result};
use lopdf::Document;

use crate::document::PdfDocument;

/// Opens `.pdf` files into a [`PdfDocument`].
#[derive(Debug, Clone)]
pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Loader for PdfLoader {
    type Document = PdfDocument;

    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn load(&self) -> Result<PdfDocument> {
        if !self.validate() {
            return Err(Error::FileNotFound(self.path.clone()));
        }

        let document = Document::load(&self.path)
            .map(PdfDocument::new)
            .map_err(|e| Error::load_failed(DocumentFormat::Pdf, e))?;

        log::info!(
            "PDF loaded from {} ({} pages)",
            self.path.display(),
            document.page_count()
        );
        Ok(document)
    }
}
