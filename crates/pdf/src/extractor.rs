//! Extraction strategy over the page/span tree.

use docmine_core::assets::{write_asset, write_table_csv};
use docmine_core::{
    AssetDirs, ExtractedImage, ExtractedTable, Extractor, Link, Result, TextExtraction,
};

use crate::annotations::page_links;
use crate::content::{page_blocks, TextBlock};
use crate::document::PdfDocument;
use crate::images::page_images;
use crate::table::detect_table;

/// Spans rendered at or above this point size are headings.
pub const HEADING_MIN_SIZE: f64 = 14.0;

/// Maps a PDF into the unified extraction model.
pub struct PdfExtractor {
    document: PdfDocument,
    assets: AssetDirs,
}

impl PdfExtractor {
    pub fn new(document: PdfDocument, assets: AssetDirs) -> Self {
        Self { document, assets }
    }

    pub fn document(&self) -> &PdfDocument {
        &self.document
    }
}

impl Extractor for PdfExtractor {
    fn extract_text(&self) -> Result<TextExtraction> {
        let doc = self.document.inner();
        let mut text = TextExtraction::new();

        for (page_number, page_id) in self.document.pages() {
            let blocks = page_blocks(doc, page_id)?;
            log::debug!("Page {}: {} text blocks", page_number, blocks.len());

            for span in blocks.iter().flat_map(TextBlock::spans) {
                text.push_fragment(page_number, &span.text);
                text.push_font_run(page_number, &span.text, span.font_name.as_str(), span.size);
                if span.size >= HEADING_MIN_SIZE {
                    text.push_heading(page_number, &span.text);
                }
            }
        }

        Ok(text)
    }

    fn extract_links(&self) -> Result<Vec<Link>> {
        let doc = self.document.inner();

        let links = self
            .document
            .pages()
            .into_iter()
            .flat_map(|(page_number, page_id)| {
                page_links(doc, page_id).into_iter().map(move |link| Link {
                    page_number,
                    text: link.text,
                    url: link.uri,
                    shape_name: None,
                })
            })
            .collect();

        Ok(links)
    }

    fn extract_images(&self) -> Result<Vec<ExtractedImage>> {
        let doc = self.document.inner();
        let mut images = Vec::new();

        for (page_number, page_id) in self.document.pages() {
            for (index, image) in page_images(doc, page_id).into_iter().enumerate() {
                let path = self.assets.image_path(&format!(
                    "page{}_image{}.{}",
                    page_number,
                    index + 1,
                    image.format
                ));
                write_asset(&path, &image.bytes)?;

                images.push(ExtractedImage {
                    page_number,
                    image_path: path.to_string_lossy().to_string(),
                    width: Some(image.width),
                    height: Some(image.height),
                    format: Some(image.format.to_string()),
                    alt_text: None,
                });
            }
        }

        Ok(images)
    }

    fn extract_tables(&self) -> Result<Vec<ExtractedTable>> {
        let doc = self.document.inner();
        let mut tables = Vec::new();

        for (page_number, page_id) in self.document.pages() {
            let blocks = page_blocks(doc, page_id)?;
            let Some(rows) = detect_table(blocks.iter().flat_map(TextBlock::spans)) else {
                continue;
            };

            let path = self.assets.table_path(&format!("page_{}.csv", page_number));
            write_table_csv(&path, &rows)?;

            tables.push(ExtractedTable {
                page_number,
                table_data: rows,
                table_path: Some(path.to_string_lossy().to_string()),
            });
        }

        Ok(tables)
    }
}
