//! Flat-file sink.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use docmine_core::{ExtractionResult, OutputLayout, PageMap};

use crate::error::Result;
use crate::Sink;

pub const TEXT_FILE: &str = "extracted_text.txt";
pub const HEADINGS_FILE: &str = "headings.txt";
pub const LINKS_FILE: &str = "extracted_links.csv";
pub const FONT_STYLES_FILE: &str = "font_styles.csv";

/// Writes text, headings, links and font runs under `<root>/<file_name>/`.
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    layout: OutputLayout,
}

impl FileSink {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }
}

impl Sink for FileSink {
    fn save(&mut self, result: &ExtractionResult, file_name: &str) -> Result<()> {
        let dir = self.layout.document_dir(file_name);
        fs::create_dir_all(&dir)?;

        write_pages(&dir.join(TEXT_FILE), &result.text_by_page, |page| {
            format!("--- Page {} ---", page)
        })?;
        write_pages(&dir.join(HEADINGS_FILE), &result.headings_by_page, |page| {
            format!("--- Page {} Headings ---", page)
        })?;

        let mut links = csv::Writer::from_path(dir.join(LINKS_FILE))?;
        links.write_record(["Page Number", "URL", "Link Text"])?;
        for link in &result.links {
            links.write_record([
                link.page_number.to_string(),
                link.url.clone(),
                link.text.clone(),
            ])?;
        }
        links.flush()?;

        let mut fonts = csv::Writer::from_path(dir.join(FONT_STYLES_FILE))?;
        fonts.write_record(["Page Number", "Text", "Font", "Size"])?;
        for run in &result.font_runs {
            fonts.write_record([
                run.page_number.to_string(),
                run.text.clone(),
                run.font_name.clone(),
                run.font_size.to_string(),
            ])?;
        }
        fonts.flush()?;

        log::info!("Extraction data saved to folder: {}", dir.display());
        Ok(())
    }
}

/// One delimiter line per page, then its entries, then a blank line.
fn write_pages(path: &Path, pages: &PageMap, header: impl Fn(u32) -> String) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (page, lines) in pages {
        writeln!(out, "{}", header(*page))?;
        for line in lines {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmine_core::{FontRun, Link};
    use tempfile::TempDir;

    fn sample_result() -> ExtractionResult {
        let mut result = ExtractionResult::default();
        result.text_by_page.insert(1, vec!["Intro".into(), "Body text".into()]);
        result.text_by_page.insert(2, vec!["Closing".into()]);
        result.headings_by_page.insert(1, vec!["Intro".into()]);
        result.font_runs.push(FontRun {
            page_number: 1,
            text: "Intro".into(),
            font_name: "Helvetica".into(),
            font_size: 16.5,
        });
        result.links.push(Link {
            page_number: 2,
            text: "site, with comma".into(),
            url: "http://example.com".into(),
            shape_name: None,
        });
        result
    }

    #[test]
    fn test_text_files_page_delimited() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(OutputLayout::new(dir.path()));
        sink.save(&sample_result(), "doc1").unwrap();

        let text = fs::read_to_string(dir.path().join("doc1").join(TEXT_FILE)).unwrap();
        assert_eq!(
            text,
            "--- Page 1 ---\nIntro\nBody text\n\n--- Page 2 ---\nClosing\n\n"
        );

        let headings = fs::read_to_string(dir.path().join("doc1").join(HEADINGS_FILE)).unwrap();
        assert_eq!(headings, "--- Page 1 Headings ---\nIntro\n\n");
    }

    #[test]
    fn test_links_csv_header_and_row() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(OutputLayout::new(dir.path()));
        sink.save(&sample_result(), "doc1").unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("doc1").join(LINKS_FILE)).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["Page Number", "URL", "Link Text"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["2", "http://example.com", "site, with comma"]);
    }

    #[test]
    fn test_font_styles_csv() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(OutputLayout::new(dir.path()));
        sink.save(&sample_result(), "doc1").unwrap();

        let fonts = fs::read_to_string(dir.path().join("doc1").join(FONT_STYLES_FILE)).unwrap();
        assert_eq!(fonts, "Page Number,Text,Font,Size\n1,Intro,Helvetica,16.5\n");
    }

    #[test]
    fn test_empty_result_writes_headers_only() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(OutputLayout::new(dir.path()));
        sink.save(&ExtractionResult::default(), "empty").unwrap();

        let doc_dir = dir.path().join("empty");
        assert_eq!(fs::read_to_string(doc_dir.join(TEXT_FILE)).unwrap(), "");
        assert_eq!(
            fs::read_to_string(doc_dir.join(LINKS_FILE)).unwrap(),
            "Page Number,URL,Link Text\n"
        );
    }
}
