//! DOCX file parser implementation.

use std::collections::HashMap;
use std::io::{Read, Seek};

use docmine_core::{Error, Result};
use docmine_ooxml::{attr, local_name, rel_id, Package};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::model::{DocxDocument, ImagePart, Paragraph, Run, Table, DEFAULT_STYLE_NAME};

/// Fallback location of the main document part.
const DOCUMENT_PART: &str = "word/document.xml";

/// Parser for DOCX (Office Open XML) files.
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOCX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<DocxDocument> {
        let package = Package::from_reader(reader)?;
        self.parse_package(&package)
    }

    /// Build the paragraph/table/relationship collection from an opened package.
    pub fn parse_package(&self, package: &Package) -> Result<DocxDocument> {
        let document_part = main_document_part(package)?;
        let relationships = package.relationships(&document_part)?;

        let styles = match relationships
            .iter()
            .find(|r| r.rel_type.ends_with("/styles"))
            .and_then(|r| r.part.as_deref())
        {
            Some(part) => match package.optional_xml_part(part)? {
                Some(xml) => StyleSheet::parse(xml)?,
                None => StyleSheet::default(),
            },
            None => StyleSheet::default(),
        };

        let body = parse_body(package.xml_part(&document_part)?, &styles)?;

        let images = relationships
            .iter()
            .filter(|r| r.is_image())
            .map(|r| ImagePart {
                rel_id: r.id.clone(),
                target: r.target.clone(),
                bytes: r
                    .part
                    .as_deref()
                    .and_then(|part| package.part(part))
                    .map(<[u8]>::to_vec),
            })
            .collect();

        log::debug!(
            "Parsed {}: {} paragraphs, {} tables",
            document_part,
            body.paragraphs.len(),
            body.tables.len()
        );

        Ok(DocxDocument {
            paragraphs: body.paragraphs,
            tables: body.tables,
            relationships,
            images,
        })
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Locate the main document part through the package root relationships.
fn main_document_part(package: &Package) -> Result<String> {
    let root = package.relationships("")?;
    let part = root
        .iter()
        .find(|r| r.rel_type.ends_with("/officeDocument"))
        .and_then(|r| r.part.clone())
        .unwrap_or_else(|| DOCUMENT_PART.to_string());
    Ok(part)
}

/// Paragraph style names keyed by style id.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleSheet {
    /// Parse `word/styles.xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut sheet = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // (style id, is paragraph style, is default)
        let mut current: Option<(String, bool, bool)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"style" => {
                            let id = attr(e, b"styleId").unwrap_or_default();
                            let paragraph = attr(e, b"type").as_deref() == Some("paragraph");
                            let default = matches!(
                                attr(e, b"default").as_deref(),
                                Some("1") | Some("true")
                            );
                            current = Some((id, paragraph, default));
                        }
                        b"name" => {
                            if let (Some((id, paragraph, default)), Some(value)) =
                                (current.as_ref(), attr(e, b"val"))
                            {
                                let display = display_name(&value);
                                if *paragraph && *default {
                                    sheet.default_paragraph = Some(display.clone());
                                }
                                sheet.names.insert(id.clone(), display);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"style" => {
                    current = None;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing styles: {}", e)));
                }
                _ => {}
            }
        }

        Ok(sheet)
    }

    /// Display name for a paragraph's style id, or the default paragraph style.
    pub fn paragraph_style(&self, style_id: Option<&str>) -> String {
        style_id
            .and_then(|id| self.names.get(id))
            .or(self.default_paragraph.as_ref())
            .cloned()
            .unwrap_or_else(|| DEFAULT_STYLE_NAME.to_string())
    }
}

/// Built-in style names are stored lowercase; Word displays them capitalised.
fn display_name(name: &str) -> String {
    let builtin = matches!(name, "caption" | "footer" | "header")
        || name
            .strip_prefix("heading ")
            .map(|level| level.parse::<u8>().is_ok())
            .unwrap_or(false);

    if !builtin {
        return name.to_string();
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Top-level paragraphs and tables of the document body.
#[derive(Debug, Default)]
struct Body {
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
}

fn parse_body(xml: &str, styles: &StyleSheet) -> Result<Body> {
    let mut reader = Reader::from_str(xml);
    let mut builder = BodyBuilder::new(styles);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => builder.open(e),
            Ok(Event::Empty(ref e)) => {
                builder.open(e);
                builder.close(local_name(e.name().as_ref()));
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                builder.text(&text);
            }
            Ok(Event::End(ref e)) => builder.close(local_name(e.name().as_ref())),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing document body: {}", e)));
            }
            _ => {}
        }
    }

    Ok(builder.body)
}

/// Cell being collected in a top-level table.
#[derive(Debug, Default)]
struct Cell {
    text: String,
    paragraphs: usize,
    span: usize,
}

/// Paragraph being collected, before its style id is resolved.
#[derive(Debug, Default)]
struct PendingParagraph {
    style_id: Option<String>,
    text: String,
    runs: Vec<Run>,
}

/// Incremental state while walking `w:body`.
struct BodyBuilder<'a> {
    styles: &'a StyleSheet,
    body: Body,
    table_depth: usize,
    text_box_depth: usize,
    table: Option<Table>,
    row: Option<Vec<String>>,
    cell: Option<Cell>,
    paragraph: Option<PendingParagraph>,
    hyperlink_id: Option<String>,
    run: Option<Run>,
    in_text: bool,
}

impl<'a> BodyBuilder<'a> {
    fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            body: Body::default(),
            table_depth: 0,
            text_box_depth: 0,
            table: None,
            row: None,
            cell: None,
            paragraph: None,
            hyperlink_id: None,
            run: None,
            in_text: false,
        }
    }

    /// Paragraphs in text boxes and nested tables are not part of the body.
    fn collecting(&self) -> bool {
        self.text_box_depth == 0 && self.table_depth <= 1
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"txbxContent" => self.text_box_depth += 1,
            b"tbl" if self.text_box_depth == 0 => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(Vec::new());
                }
            }
            b"tr" if self.table_depth == 1 && self.text_box_depth == 0 => {
                self.row = Some(Vec::new());
            }
            b"tc" if self.table_depth == 1 && self.text_box_depth == 0 => {
                self.cell = Some(Cell {
                    span: 1,
                    ..Cell::default()
                });
            }
            b"gridSpan" if self.table_depth == 1 && self.text_box_depth == 0 => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.span = attr(e, b"val")
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(1)
                        .max(1);
                }
            }
            b"p" if self.collecting() => self.paragraph = Some(PendingParagraph::default()),
            b"pStyle" if self.collecting() => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.style_id = attr(e, b"val");
                }
            }
            b"hyperlink" if self.collecting() && self.paragraph.is_some() => {
                self.hyperlink_id = rel_id(e);
            }
            b"r" if self.collecting() && self.paragraph.is_some() => {
                self.run = Some(Run {
                    text: String::new(),
                    hyperlink_id: self.hyperlink_id.clone(),
                });
            }
            b"t" if self.collecting() => self.in_text = true,
            b"tab" if self.collecting() => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\t');
                }
            }
            b"br" | b"cr" if self.collecting() => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\n');
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"txbxContent" => self.text_box_depth = self.text_box_depth.saturating_sub(1),
            b"t" if self.collecting() => self.in_text = false,
            b"r" if self.collecting() => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.text.push_str(&run.text);
                    paragraph.runs.push(run);
                }
            }
            b"hyperlink" if self.collecting() => self.hyperlink_id = None,
            b"p" if self.collecting() => self.finish_paragraph(),
            b"tc" if self.table_depth == 1 && self.text_box_depth == 0 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    let text = cell.text.trim().to_string();
                    row.extend(std::iter::repeat(text).take(cell.span));
                }
            }
            b"tr" if self.table_depth == 1 && self.text_box_depth == 0 => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.push(row);
                }
            }
            b"tbl" if self.text_box_depth == 0 => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.body.tables.push(table);
                    }
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text || !self.collecting() {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(pending) = self.paragraph.take() else {
            return;
        };
        self.run = None;
        self.hyperlink_id = None;

        if self.table_depth == 0 {
            self.body.paragraphs.push(Paragraph {
                style_name: self.styles.paragraph_style(pending.style_id.as_deref()),
                text: pending.text,
                runs: pending.runs,
            });
        } else if let Some(cell) = self.cell.as_mut() {
            if cell.paragraphs > 0 {
                cell.text.push('\n');
            }
            cell.text.push_str(&pending.text);
            cell.paragraphs += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/></w:style>
  <w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/></w:style>
</w:styles>"#;

    const BODY: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape">
<w:body>
  <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Overview</w:t></w:r></w:p>
  <w:p><w:r><w:t xml:space="preserve">See </w:t></w:r><w:hyperlink r:id="rId9"><w:r><w:rPr><w:rStyle w:val="Hyperlink"/></w:rPr><w:t>the site</w:t></w:r></w:hyperlink><w:r><w:tab/><w:t>now</w:t></w:r></w:p>
  <w:p><w:r><w:t>Outer</w:t></w:r><w:r><w:drawing><wps:txbx><w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></wps:txbx></w:drawing></w:r></w:p>
  <w:p/>
  <w:tbl>
    <w:tr><w:tc><w:p><w:r><w:t> Name </w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Qty</w:t></w:r></w:p></w:tc></w:tr>
    <w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>merged</w:t></w:r></w:p></w:tc></w:tr>
    <w:tr><w:tc><w:p><w:r><w:t>line1</w:t></w:r></w:p><w:p><w:r><w:t>line2</w:t></w:r></w:p>
      <w:tbl><w:tr><w:tc><w:p><w:r><w:t>nested</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:tc></w:tr>
  </w:tbl>
  <w:p><w:pPr><w:pStyle w:val="Quote"/></w:pPr><w:r><w:t>After</w:t></w:r></w:p>
  <w:sectPr/>
</w:body></w:document>"#;

    fn body() -> Body {
        let styles = StyleSheet::parse(STYLES).unwrap();
        parse_body(BODY, &styles).unwrap()
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("heading 1"), "Heading 1");
        assert_eq!(display_name("caption"), "Caption");
        assert_eq!(display_name("heading x"), "heading x");
        assert_eq!(display_name("Normal"), "Normal");
    }

    #[test]
    fn test_style_sheet_lookup() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(styles.paragraph_style(Some("Heading1")), "Heading 1");
        assert_eq!(styles.paragraph_style(None), "Normal");
        assert_eq!(styles.paragraph_style(Some("Unknown")), "Normal");
        assert_eq!(StyleSheet::default().paragraph_style(None), DEFAULT_STYLE_NAME);
    }

    #[test]
    fn test_body_paragraphs() {
        let body = body();
        let texts: Vec<&str> = body.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Overview", "See the site\tnow", "Outer", "", "After"]);

        assert_eq!(body.paragraphs[0].style_name, "Heading 1");
        assert_eq!(body.paragraphs[1].style_name, "Normal");
        assert_eq!(body.paragraphs[4].style_name, "Quote");
    }

    #[test]
    fn test_hyperlink_runs() {
        let body = body();
        let runs = &body.paragraphs[1].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].hyperlink_id, None);
        assert_eq!(runs[1].text, "the site");
        assert_eq!(runs[1].hyperlink_id.as_deref(), Some("rId9"));
        assert_eq!(runs[2].hyperlink_id, None);
    }

    #[test]
    fn test_top_level_table() {
        let body = body();
        assert_eq!(body.tables.len(), 1);

        let table = &body.tables[0];
        assert_eq!(table[0], vec!["Name", "Qty"]);
        assert_eq!(table[1], vec!["merged", "merged"]);
        assert_eq!(table[2], vec!["line1\nline2"]);
    }
}
