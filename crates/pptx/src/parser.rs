//! PPTX file parser implementation.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use docmine_core::{Error, Result};
use docmine_ooxml::{attr, local_name, rel_id, Package, Relationships};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::model::{Paragraph, PptxDocument, Shape, ShapeKind, Slide, TextFrame, TextRun};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<PptxDocument> {
        let package = Package::from_reader(reader)?;
        self.parse_package(&package)
    }

    /// Build the slide/shape tree from an opened package.
    pub fn parse_package(&self, package: &Package) -> Result<PptxDocument> {
        let mut document = PptxDocument::default();

        for (idx, slide_path) in self.slide_order(package)?.iter().enumerate() {
            let (slide, media) = self.parse_slide(package, slide_path, idx as u32 + 1)?;
            document.slides.push(slide);
            document.media.extend(media);
        }

        Ok(document)
    }

    /// Slide part paths in presentation order.
    ///
    /// Follows `p:sldIdLst` in `presentation.xml`; falls back to the numeric
    /// order of the slide relationships when the list is absent.
    fn slide_order(&self, package: &Package) -> Result<Vec<String>> {
        let rels = package.relationships(PRESENTATION_PART)?;
        let xml = package.xml_part(PRESENTATION_PART)?;

        let mut ordered = Vec::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    if let Some(part) =
                        rel_id(e).and_then(|id| rels.part(&id).map(str::to_string))
                    {
                        ordered.push(part);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        if !ordered.is_empty() {
            return Ok(ordered);
        }

        let mut slides: Vec<(String, Option<usize>)> = rels
            .iter()
            .filter(|r| r.is_slide())
            .filter_map(|r| {
                let order = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
                r.part.clone().map(|part| (part, order))
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide, returning it with the media its pictures embed.
    fn parse_slide(
        &self,
        package: &Package,
        slide_path: &str,
        slide_number: u32,
    ) -> Result<(Slide, BTreeMap<String, Vec<u8>>)> {
        let xml = package.xml_part(slide_path)?;
        let rels = package.relationships(slide_path)?;

        let mut slide = Slide::new(slide_number);
        slide.shapes = extract_shapes_from_xml(xml, &rels)?;

        let mut media = BTreeMap::new();
        for part in slide.shapes.iter().filter_map(|s| s.image_part.as_deref()) {
            match package.part(part) {
                Some(bytes) => {
                    media.insert(part.to_string(), bytes.to_vec());
                }
                None => log::warn!(
                    "Slide {} references missing media part '{}'",
                    slide_number,
                    part
                ),
            }
        }

        log::debug!(
            "Parsed slide {} ({}): {} shapes",
            slide_number,
            slide_path,
            slide.shapes.len()
        );
        Ok((slide, media))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the shape tree from slide XML.
fn extract_shapes_from_xml(xml_content: &str, rels: &Relationships) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml_content);
    let mut builder = ShapeTreeBuilder::new(rels);

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
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(builder.shapes)
}

/// Incremental state while walking the elements of one slide.
struct ShapeTreeBuilder<'a> {
    rels: &'a Relationships,
    shapes: Vec<Shape>,
    shape: Option<Shape>,
    in_shape_props: bool,
    paragraph: Option<Paragraph>,
    run: Option<TextRun>,
    in_run_props: bool,
    in_text: bool,
    table: Option<Vec<Vec<String>>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
    cell_paragraphs: usize,
}

impl<'a> ShapeTreeBuilder<'a> {
    fn new(rels: &'a Relationships) -> Self {
        Self {
            rels,
            shapes: Vec::new(),
            shape: None,
            in_shape_props: false,
            paragraph: None,
            run: None,
            in_run_props: false,
            in_text: false,
            table: None,
            row: None,
            cell: None,
            cell_paragraphs: 0,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"sp" => self.shape = Some(Shape::new(ShapeKind::AutoShape)),
            b"pic" => self.shape = Some(Shape::new(ShapeKind::Picture)),
            b"graphicFrame" => self.shape = Some(Shape::new(ShapeKind::GraphicFrame)),
            b"cxnSp" => self.shape = Some(Shape::new(ShapeKind::Connector)),
            b"cNvPr" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.name = attr(e, b"name").unwrap_or_default();
                    shape.alt_text = attr(e, b"descr").filter(|d| !d.is_empty());
                    self.in_shape_props = true;
                }
            }
            b"ph" => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.placeholder =
                        Some(attr(e, b"type").unwrap_or_else(|| "body".to_string()));
                }
            }
            b"hlinkClick" => {
                let url = rel_id(e).and_then(|id| self.rels.external_address(&id));
                if self.in_run_props {
                    if let Some(run) = self.run.as_mut() {
                        run.url = url;
                    }
                } else if self.in_shape_props {
                    if let Some(shape) = self.shape.as_mut() {
                        shape.click_url = url;
                    }
                }
            }
            b"txBody" if self.table.is_none() => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.text_frame = Some(TextFrame::default());
                }
            }
            b"p" => {
                if let Some(cell) = self.cell.as_mut() {
                    if self.cell_paragraphs > 0 {
                        cell.push('\n');
                    }
                    self.cell_paragraphs += 1;
                } else if self.has_text_frame() {
                    self.paragraph = Some(Paragraph::default());
                }
            }
            b"r" | b"fld" => {
                if self.paragraph.is_some() {
                    self.run = Some(TextRun::default());
                }
            }
            b"rPr" => {
                if let Some(run) = self.run.as_mut() {
                    run.font_size = attr(e, b"sz")
                        .and_then(|sz| sz.parse::<f64>().ok())
                        .map(|sz| sz / 100.0);
                    self.in_run_props = true;
                }
            }
            b"latin" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.font_name = attr(e, b"typeface").filter(|t| !t.is_empty());
                }
            }
            b"br" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.push('\n');
                } else if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.text.push('\n');
                }
            }
            b"t" => self.in_text = true,
            b"blip" => {
                let part = attr(e, b"embed")
                    .and_then(|id| self.rels.part(&id).map(str::to_string));
                if let Some(shape) = self.shape.as_mut() {
                    if shape.image_part.is_none() {
                        shape.image_part = part;
                    }
                }
            }
            b"tbl" if self.shape.is_some() => self.table = Some(Vec::new()),
            b"tr" if self.table.is_some() => self.row = Some(Vec::new()),
            b"tc" if self.row.is_some() => {
                self.cell = Some(String::new());
                self.cell_paragraphs = 0;
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_props = false,
            b"cNvPr" => self.in_shape_props = false,
            b"r" | b"fld" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.text.push_str(&run.text);
                    paragraph.runs.push(run);
                }
            }
            b"p" => {
                if self.cell.is_none() {
                    if let Some(paragraph) = self.paragraph.take() {
                        if let Some(frame) = self.text_frame_mut() {
                            frame.paragraphs.push(paragraph);
                        }
                    }
                }
            }
            b"tc" => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.push(cell.trim().to_string());
                }
            }
            b"tr" => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.push(row);
                }
            }
            b"tbl" => {
                if let (Some(table), Some(shape)) = (self.table.take(), self.shape.as_mut()) {
                    shape.table = Some(table);
                }
            }
            b"sp" | b"pic" | b"graphicFrame" | b"cxnSp" => {
                if let Some(shape) = self.shape.take() {
                    self.shapes.push(shape);
                }
                self.paragraph = None;
                self.run = None;
                self.in_shape_props = false;
                self.in_run_props = false;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        } else if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn has_text_frame(&self) -> bool {
        self.shape
            .as_ref()
            .map(|s| s.text_frame.is_some())
            .unwrap_or(false)
    }

    fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        self.shape.as_mut().and_then(|s| s.text_frame.as_mut())
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
</Relationships>"#;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="4400"><a:latin typeface="Calibri"/></a:rPr><a:t>Quarterly </a:t></a:r><a:r><a:t>Review</a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:grpSp>
      <p:sp>
        <p:nvSpPr><p:cNvPr id="3" name="Link Box"><a:hlinkClick r:id="rId3"/></p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
        <p:txBody><a:p><a:r><a:rPr><a:hlinkClick r:id="rId3"/></a:rPr><a:t>Visit us</a:t></a:r><a:br/><a:r><a:t>today</a:t></a:r></a:p></p:txBody>
      </p:sp>
    </p:grpSp>
    <p:pic>
      <p:nvPicPr><p:cNvPr id="4" name="Picture 3" descr="Company logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
      <p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
    </p:pic>
    <p:graphicFrame>
      <p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>
      <a:graphic><a:graphicData><a:tbl>
        <a:tr><a:tc><a:txBody><a:p><a:r><a:t> Region </a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Sales</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
        <a:tr><a:tc><a:txBody><a:p><a:r><a:t>North</a:t></a:r></a:p><a:p><a:r><a:t>East</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p/></a:txBody></a:tc></a:tr>
      </a:tbl></a:graphicData></a:graphic>
    </p:graphicFrame>
  </p:spTree></p:cSld>
</p:sld>"#;

    fn shapes() -> Vec<Shape> {
        let rels = Relationships::parse(SLIDE_RELS, "ppt/slides/slide1.xml").unwrap();
        extract_shapes_from_xml(SLIDE, &rels).unwrap()
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_title_placeholder_and_runs() {
        let shapes = shapes();
        assert_eq!(shapes.len(), 4);

        let title = &shapes[0];
        assert!(title.is_title());
        assert_eq!(title.text(), "Quarterly Review");

        let runs = &title.text_frame.as_ref().unwrap().paragraphs[0].runs;
        assert_eq!(runs[0].font_name.as_deref(), Some("Calibri"));
        assert_eq!(runs[0].font_size, Some(44.0));
        assert_eq!(runs[1].font_size, None);
    }

    #[test]
    fn test_group_children_and_hyperlinks() {
        let shapes = shapes();
        let link_box = &shapes[1];
        assert_eq!(link_box.name, "Link Box");
        assert_eq!(link_box.click_url.as_deref(), Some("https://example.com/"));
        assert_eq!(link_box.text(), "Visit us\ntoday");

        let runs = &link_box.text_frame.as_ref().unwrap().paragraphs[0].runs;
        assert_eq!(runs[0].url.as_deref(), Some("https://example.com/"));
        assert_eq!(runs[1].url, None);
    }

    #[test]
    fn test_picture_and_table() {
        let shapes = shapes();

        let picture = &shapes[2];
        assert!(picture.is_picture());
        assert_eq!(picture.alt_text.as_deref(), Some("Company logo"));
        assert_eq!(picture.image_part.as_deref(), Some("ppt/media/image1.png"));

        let table = shapes[3].table.as_ref().unwrap();
        assert_eq!(
            table,
            &vec![
                vec!["Region".to_string(), "Sales".to_string()],
                vec!["North\nEast".to_string(), String::new()],
            ]
        );
        assert!(shapes[3].text_frame.is_none());
    }
}
