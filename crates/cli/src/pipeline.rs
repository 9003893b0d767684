//! Format dispatch: one extraction strategy per supported document format.

use std::path::Path;

use docmine_core::{
    document_base_name, DocumentFormat, ExtractedImage, ExtractedTable, ExtractionResult,
    Extractor, Link, Loader, OutputLayout, Result, TextExtraction,
};
use docmine_docx::{DocxExtractor, DocxLoader};
use docmine_pdf::{PdfExtractor, PdfLoader};
use docmine_pptx::{PptxExtractor, PptxLoader};

/// Extraction strategy selected once from the file extension.
pub enum Normalizer {
    Pdf(PdfExtractor),
    Docx(DocxExtractor),
    Pptx(PptxExtractor),
}

impl Normalizer {
    /// Load a document and pair it with its format's strategy. Assets go to
    /// the layout's directories for the document's base name.
    pub fn load(path: &Path, layout: &OutputLayout) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let assets = layout.assets_for(&document_base_name(path));

        log::debug!("Loading {} as {}", path.display(), format);
        let normalizer = match format {
            DocumentFormat::Pdf => {
                Self::Pdf(PdfExtractor::new(PdfLoader::new(path).load()?, assets))
            }
            DocumentFormat::Docx => {
                Self::Docx(DocxExtractor::new(DocxLoader::new(path).load()?, assets))
            }
            DocumentFormat::Pptx => {
                Self::Pptx(PptxExtractor::new(PptxLoader::new(path).load()?, assets))
            }
        };
        Ok(normalizer)
    }

    pub fn format(&self) -> DocumentFormat {
        match self {
            Self::Pdf(_) => DocumentFormat::Pdf,
            Self::Docx(_) => DocumentFormat::Docx,
            Self::Pptx(_) => DocumentFormat::Pptx,
        }
    }

    fn strategy(&self) -> &dyn Extractor {
        match self {
            Self::Pdf(extractor) => extractor,
            Self::Docx(extractor) => extractor,
            Self::Pptx(extractor) => extractor,
        }
    }
}

impl Extractor for Normalizer {
    fn extract_text(&self) -> Result<TextExtraction> {
        self.strategy().extract_text()
    }

    fn extract_links(&self) -> Result<Vec<Link>> {
        self.strategy().extract_links()
    }

    fn extract_images(&self) -> Result<Vec<ExtractedImage>> {
        self.strategy().extract_images()
    }

    fn extract_tables(&self) -> Result<Vec<ExtractedTable>> {
        self.strategy().extract_tables()
    }
}

/// Load and normalize one file, returning its base name and result.
pub fn process_file(path: &Path, layout: &OutputLayout) -> Result<(String, ExtractionResult)> {
    let normalizer = Normalizer::load(path, layout)?;
    let result = normalizer.extract_all()?;

    log::info!(
        "{} ({}): {} fragments, {} links, {} images, {} tables",
        path.display(),
        normalizer.format(),
        result.fragment_count(),
        result.links.len(),
        result.images.len(),
        result.tables.len()
    );

    Ok((document_base_name(path), result))
}
