//! Extraction strategy over the slide/shape tree.

use std::io::Cursor;

use docmine_core::assets::{write_asset, write_table_csv};
use docmine_core::{
    AssetDirs, ExtractedImage, ExtractedTable, Extractor, Link, Result, TextExtraction,
};
use image::{GenericImageView, ImageFormat};

use crate::model::PptxDocument;

/// Font name recorded for runs without an explicit typeface.
pub const DEFAULT_FONT_NAME: &str = "Default";

/// Point size recorded for runs without an explicit size.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Maps a presentation into the unified extraction model.
pub struct PptxExtractor {
    document: PptxDocument,
    assets: AssetDirs,
}

impl PptxExtractor {
    pub fn new(document: PptxDocument, assets: AssetDirs) -> Self {
        Self { document, assets }
    }

    pub fn document(&self) -> &PptxDocument {
        &self.document
    }
}

impl Extractor for PptxExtractor {
    fn extract_text(&self) -> Result<TextExtraction> {
        let mut text = TextExtraction::new();

        for slide in &self.document.slides {
            if let Some(title) = slide.title() {
                let title_text = title.text();
                if !title_text.trim().is_empty() {
                    text.push_fragment(slide.number, &title_text);
                    text.push_heading(slide.number, &title_text);
                }
            }

            for frame in slide.shapes.iter().filter_map(|s| s.text_frame.as_ref()) {
                for paragraph in &frame.paragraphs {
                    text.push_fragment(slide.number, &paragraph.text);

                    for run in &paragraph.runs {
                        text.push_font_run(
                            slide.number,
                            &run.text,
                            run.font_name.as_deref().unwrap_or(DEFAULT_FONT_NAME),
                            run.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                        );
                    }
                }
            }
        }

        Ok(text)
    }

    fn extract_links(&self) -> Result<Vec<Link>> {
        let mut links = Vec::new();

        for slide in &self.document.slides {
            for shape in &slide.shapes {
                if let Some(url) = &shape.click_url {
                    links.push(Link {
                        page_number: slide.number,
                        text: shape.text(),
                        url: url.clone(),
                        shape_name: Some(shape.name.clone()),
                    });
                }

                let Some(frame) = &shape.text_frame else {
                    continue;
                };
                for run in frame.paragraphs.iter().flat_map(|p| p.runs.iter()) {
                    if let Some(url) = &run.url {
                        links.push(Link {
                            page_number: slide.number,
                            text: run.text.clone(),
                            url: url.clone(),
                            shape_name: Some(shape.name.clone()),
                        });
                    }
                }
            }
        }

        Ok(links)
    }

    fn extract_images(&self) -> Result<Vec<ExtractedImage>> {
        let mut images = Vec::new();
        let mut counter = 0usize;

        for slide in &self.document.slides {
            for shape in slide.shapes.iter().filter(|s| s.is_picture()) {
                counter += 1;

                let Some(bytes) = shape
                    .image_part
                    .as_deref()
                    .and_then(|part| self.document.media(part))
                else {
                    log::warn!(
                        "Slide {}: picture '{}' has no embedded image, skipping",
                        slide.number,
                        shape.name
                    );
                    continue;
                };

                let decoded = match image::load_from_memory(bytes) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        log::warn!(
                            "Slide {}: failed to decode picture '{}': {}",
                            slide.number,
                            shape.name,
                            e
                        );
                        continue;
                    }
                };

                let mut png = Vec::new();
                if let Err(e) = decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
                    log::warn!(
                        "Slide {}: failed to re-encode picture '{}': {}",
                        slide.number,
                        shape.name,
                        e
                    );
                    continue;
                }

                let path = self
                    .assets
                    .image_path(&format!("slide{}_image{}.png", slide.number, counter));
                write_asset(&path, &png)?;

                let (width, height) = decoded.dimensions();
                images.push(ExtractedImage {
                    page_number: slide.number,
                    image_path: path.to_string_lossy().to_string(),
                    width: Some(width),
                    height: Some(height),
                    format: Some("png".to_string()),
                    alt_text: shape.alt_text.clone(),
                });
            }
        }

        Ok(images)
    }

    fn extract_tables(&self) -> Result<Vec<ExtractedTable>> {
        let mut tables = Vec::new();
        let mut counter = 0usize;

        for slide in &self.document.slides {
            for table in slide.shapes.iter().filter_map(|s| s.table.as_ref()) {
                counter += 1;

                let path = self
                    .assets
                    .table_path(&format!("slide{}_table{}.csv", slide.number, counter));
                write_table_csv(&path, table)?;

                tables.push(ExtractedTable {
                    page_number: slide.number,
                    table_data: table.clone(),
                    table_path: Some(path.to_string_lossy().to_string()),
                });
            }
        }

        Ok(tables)
    }
}
