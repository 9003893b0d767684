//! PPTX loader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use docmine_core::{DocumentFormat, Error, Loader, Result};

use crate::model::PptxDocument;
use crate::parser::PptxParser;

/// Opens `.pptx` files into a [`PptxDocument`].
#[derive(Debug, Clone)]
pub struct PptxLoader {
    path: PathBuf,
}

impl PptxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Loader for PptxLoader {
    type Document = PptxDocument;

    fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn load(&self) -> Result<PptxDocument> {
        if !self.validate() {
            return Err(Error::FileNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let document = PptxParser::new()
            .parse(BufReader::new(file))
            .map_err(|e| Error::load_failed(DocumentFormat::Pptx, e))?;

        log::info!(
            "PPTX loaded from {} ({} slides)",
            self.path.display(),
            document.slides.len()
        );
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
        let loader = PptxLoader::new("does/not/exist.pptx");
        assert!(!loader.validate());
        assert!(matches!(loader.load(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pptx");
        File::create(&path)
            .unwrap()
            .write_all(b"this is not a zip archive")
            .unwrap();

        match PptxLoader::new(&path).load() {
            Err(Error::LoadFailed { format, .. }) => assert_eq!(format, DocumentFormat::Pptx),
            other => panic!("unexpected: {:?}", other.map(|d| d.slides.len())),
        }
    }
}
