//! Domain types for representing extracted document content.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mapping from 1-based page (or slide) number to strings on that page.
pub type PageMap = BTreeMap<u32, Vec<String>>;

/// The format of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Word (Office Open XML).
    Docx,
    /// PowerPoint (Office Open XML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from a path, failing with the offending extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        Self::from_extension(ext).ok_or_else(|| {
            if ext.is_empty() {
                Error::UnsupportedFormat("(no extension)".to_string())
            } else {
                Error::UnsupportedFormat(format!(".{}", ext))
            }
        })
    }

    /// Short uppercase label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Pptx => "PPTX",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One contiguous styled text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRun {
    pub page_number: u32,
    pub text: String,
    pub font_name: String,
    pub font_size: f64,
}

/// Headings and font styles gathered alongside the page text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetadata {
    pub headings_by_page: PageMap,
    pub font_styles: Vec<FontRun>,
}

/// Output of a text pass over one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextExtraction {
    pub text_by_page: PageMap,
    pub metadata: TextMetadata,
}

impl TextExtraction {
    /// Create an empty text extraction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a non-empty fragment to a page. Whitespace-only input is dropped.
    pub fn push_fragment(&mut self, page_number: u32, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.text_by_page
                .entry(page_number)
                .or_default()
                .push(text.to_string());
        }
    }

    /// Record a heading for a page. Whitespace-only input is dropped.
    pub fn push_heading(&mut self, page_number: u32, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.metadata
                .headings_by_page
                .entry(page_number)
                .or_default()
                .push(text.to_string());
        }
    }

    /// Record a font run. Whitespace-only input is dropped.
    pub fn push_font_run(
        &mut self,
        page_number: u32,
        text: &str,
        font_name: impl Into<String>,
        font_size: f64,
    ) {
        let text = text.trim();
        if !text.is_empty() {
            self.metadata.font_styles.push(FontRun {
                page_number,
                text: text.to_string(),
                font_name: font_name.into(),
                font_size,
            });
        }
    }
}

/// A hyperlink found in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub page_number: u32,
    pub text: String,
    pub url: String,
    /// Only populated for links attached to slide shapes.
    pub shape_name: Option<String>,
}

/// An embedded image that was written to the images directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedImage {
    pub page_number: u32,
    pub image_path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub alt_text: Option<String>,
}

/// A table recovered from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub page_number: u32,
    /// Rows of cell strings. Irregular rows are kept as-is.
    pub table_data: Vec<Vec<String>>,
    pub table_path: Option<String>,
}

/// Unified representation of everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text_by_page: PageMap,
    pub headings_by_page: PageMap,
    pub font_runs: Vec<FontRun>,
    pub links: Vec<Link>,
    pub images: Vec<ExtractedImage>,
    pub tables: Vec<ExtractedTable>,
}

impl ExtractionResult {
    /// Assemble a result from the output of the four extraction passes.
    pub fn from_parts(
        text: TextExtraction,
        links: Vec<Link>,
        images: Vec<ExtractedImage>,
        tables: Vec<ExtractedTable>,
    ) -> Self {
        Self {
            text_by_page: text.text_by_page,
            headings_by_page: text.metadata.headings_by_page,
            font_runs: text.metadata.font_styles,
            links,
            images,
            tables,
        }
    }

    /// Total number of text fragments across all pages.
    pub fn fragment_count(&self) -> usize {
        self.text_by_page.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), None);
    }

    #[test]
    fn test_format_from_path_names_extension() {
        let path = PathBuf::from("data/report.xlsx");
        match DocumentFormat::from_path(&path) {
            Err(Error::UnsupportedFormat(ext)) => assert_eq!(ext, ".xlsx"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("a/b.Pdf")).unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn test_push_fragment_drops_blank() {
        let mut text = TextExtraction::new();
        text.push_fragment(1, "   ");
        text.push_font_run(1, "\t", "Arial", 12.0);
        assert!(text.text_by_page.is_empty());
        assert!(text.metadata.font_styles.is_empty());

        text.push_fragment(2, "  Hello ");
        assert_eq!(text.text_by_page[&2], vec!["Hello"]);
    }

    #[test]
    fn test_from_parts_flattens_metadata() {
        let mut text = TextExtraction::new();
        text.push_fragment(1, "Intro");
        text.push_heading(1, "Intro");
        text.push_font_run(1, "Intro", "Helvetica", 16.0);

        let result = ExtractionResult::from_parts(text, Vec::new(), Vec::new(), Vec::new());
        assert_eq!(result.headings_by_page[&1], vec!["Intro"]);
        assert_eq!(result.font_runs.len(), 1);
        assert_eq!(result.fragment_count(), 1);
    }
}
