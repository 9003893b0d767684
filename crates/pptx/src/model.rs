//! Parsed slide/shape tree of a presentation.

use std::collections::BTreeMap;

/// A loaded presentation: slides in presentation order plus embedded media.
#[derive(Debug, Clone, Default)]
pub struct PptxDocument {
    pub slides: Vec<Slide>,
    /// Media parts referenced by pictures, keyed by part path.
    pub media: BTreeMap<String, Vec<u8>>,
}

impl PptxDocument {
    /// Bytes of a media part referenced by a picture.
    pub fn media(&self, part: &str) -> Option<&[u8]> {
        self.media.get(part).map(Vec::as_slice)
    }
}

/// One slide.
#[derive(Debug, Clone, Default)]
pub struct Slide {
    /// 1-based slide number.
    pub number: u32,
    /// Shapes in document order; group shapes are flattened into their children.
    pub shapes: Vec<Shape>,
}

impl Slide {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// The title placeholder, if the slide has one.
    pub fn title(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_title())
    }
}

/// Kind of shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    /// `p:sp`
    #[default]
    AutoShape,
    /// `p:pic`
    Picture,
    /// `p:graphicFrame` (tables, charts, diagrams)
    GraphicFrame,
    /// `p:cxnSp`
    Connector,
}

/// A shape with whatever content it carries.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub kind: ShapeKind,
    pub name: String,
    /// Alternative text (`descr`).
    pub alt_text: Option<String>,
    /// Placeholder type (`title`, `body`, ...), for placeholder shapes.
    pub placeholder: Option<String>,
    pub text_frame: Option<TextFrame>,
    /// External address of a shape-level click action.
    pub click_url: Option<String>,
    /// Media part of a picture's embedded image.
    pub image_part: Option<String>,
    pub table: Option<Vec<Vec<String>>>,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(
            self.placeholder.as_deref(),
            Some("title") | Some("ctrTitle")
        )
    }

    pub fn is_picture(&self) -> bool {
        self.kind == ShapeKind::Picture
    }

    /// Full text of the text frame, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.text_frame
            .as_ref()
            .map(TextFrame::text)
            .unwrap_or_default()
    }
}

/// Text container of a shape.
#[derive(Debug, Clone, Default)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A paragraph: its runs, plus the concatenated text including line breaks.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub text: String,
    pub runs: Vec<TextRun>,
}

/// A run of text with its character properties.
#[derive(Debug, Clone, Default)]
pub struct TextRun {
    pub text: String,
    /// Latin typeface, when set on the run.
    pub font_name: Option<String>,
    /// Size in points, when set on the run.
    pub font_size: Option<f64>,
    /// External address of a run-level hyperlink.
    pub url: Option<String>,
}
