//! Extraction strategy over the paragraph/table/relationship collection.

use docmine_core::assets::{write_asset, write_table_csv};
use docmine_core::{
    AssetDirs, ExtractedImage, ExtractedTable, Extractor, Link, Result, TextExtraction,
};

use crate::model::DocxDocument;

/// Word documents have no pages; everything lands on page 1.
const PAGE: u32 = 1;

/// Point size recorded for every paragraph font run.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Maps a Word document into the unified extraction model.
pub struct DocxExtractor {
    document: DocxDocument,
    assets: AssetDirs,
}

impl DocxExtractor {
    pub fn new(document: DocxDocument, assets: AssetDirs) -> Self {
        Self { document, assets }
    }

    pub fn document(&self) -> &DocxDocument {
        &self.document
    }
}

impl Extractor for DocxExtractor {
    fn extract_text(&self) -> Result<TextExtraction> {
        let mut text = TextExtraction::new();

        for paragraph in &self.document.paragraphs {
            let trimmed = paragraph.text.trim();
            if trimmed.is_empty() {
                continue;
            }

            text.push_fragment(PAGE, trimmed);
            if paragraph.is_heading() {
                text.push_heading(PAGE, trimmed);
            }
            text.push_font_run(PAGE, trimmed, &paragraph.style_name, DEFAULT_FONT_SIZE);
        }

        Ok(text)
    }

    fn extract_links(&self) -> Result<Vec<Link>> {
        let relationships = &self.document.relationships;

        let links = self
            .document
            .paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .filter_map(|run| {
                let id = run.hyperlink_id.as_deref()?;
                let url = relationships.external_address(id)?;
                Some(Link {
                    page_number: PAGE,
                    text: run.text.clone(),
                    url,
                    shape_name: None,
                })
            })
            .collect();

        Ok(links)
    }

    fn extract_images(&self) -> Result<Vec<ExtractedImage>> {
        let mut images = Vec::new();

        for part in &self.document.images {
            let Some(bytes) = part.bytes.as_deref() else {
                log::warn!(
                    "Image relationship {} ({}) has no embedded payload, skipping",
                    part.rel_id,
                    part.target
                );
                continue;
            };

            let extension = part.extension();
            let path = self
                .assets
                .image_path(&format!("image_{}.{}", images.len() + 1, extension));
            write_asset(&path, bytes)?;

            images.push(ExtractedImage {
                page_number: PAGE,
                image_path: path.to_string_lossy().to_string(),
                width: None,
                height: None,
                format: Some(extension),
                alt_text: None,
            });
        }

        Ok(images)
    }

    fn extract_tables(&self) -> Result<Vec<ExtractedTable>> {
        let mut tables = Vec::new();

        for (index, table) in self.document.tables.iter().enumerate() {
            let path = self.assets.table_path(&format!("table_{}.csv", index + 1));
            write_table_csv(&path, table)?;

            tables.push(ExtractedTable {
                page_number: PAGE,
                table_data: table.clone(),
                table_path: Some(path.to_string_lossy().to_string()),
            });
        }

        Ok(tables)
    }
}
