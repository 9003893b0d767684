//! DOCX loader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use docmine_core::{DocumentFormat, Error, Loader, Result};

use crate::model::DocxDocument;
use crate::parser::DocxParser;

/// Opens `.docx` files into a [`DocxDocument`].
#[derive(Debug, Clone)]
pub struct DocxLoader {
    path: PathBuf,
}

impl DocxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Loader for DocxLoader {
    type Document = DocxDocument;

    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn load(&self) -> Result<DocxDocument> {
        if !self.validate() {
            return Err(Error::FileNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let document = DocxParser::new()
            .parse(BufReader::new(file))
            .map_err(|e| Error::load_failed(DocumentFormat::Docx, e))?;

        log::info!("DOCX loaded from {}", self.path.display());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file() {
        let loader = DocxLoader::new("nowhere/report.docx");
        assert!(!loader.validate());
        assert!(matches!(loader.load(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        File::create(&path).unwrap().write_all(b"plain text").unwrap();

        match DocxLoader::new(&path).load() {
            Err(Error::LoadFailed { format, .. }) => assert_eq!(format, DocumentFormat::Docx),
            other => panic!("unexpected: {:?}", other.map(|d| d.paragraphs.len())),
        }
    }
}
