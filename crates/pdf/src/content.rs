//! Content stream interpretation into positioned text spans.
//!
//! Text objects (`BT`/`ET`) become blocks, baseline changes start new lines,
//! and runs of one font and size inside a line become spans.

use docmine_core::{Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};

use crate::fonts::FontSet;
use crate::objects::{name, number};

/// Baselines closer than this belong to the same line.
const LINE_TOLERANCE: f64 = 0.5;

/// `TJ` adjustments more negative than this are rendered as a word gap.
const WORD_GAP_ADJUSTMENT: f64 = -200.0;

/// Average glyph width as a fraction of the font size, used to advance the
/// text position when glyph widths are not consulted.
const GLYPH_WIDTH_RATIO: f64 = 0.5;

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Run of text sharing one font and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_name: String,
    /// Rendered point size, rounded to two decimals.
    pub size: f64,
    pub x: f64,
    pub y: f64,
}

impl TextSpan {
    /// Estimated end of the span on the x axis.
    pub fn estimated_end(&self) -> f64 {
        self.x + self.text.chars().count() as f64 * self.size * GLYPH_WIDTH_RATIO
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn baseline(&self) -> Option<f64> {
        self.spans.first().map(|s| s.y)
    }
}

/// Lines of one text object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines.iter().flat_map(|line| line.spans.iter())
    }
}

/// Decode and lay out the content streams of one page.
pub fn page_blocks(doc: &Document, page_id: ObjectId) -> Result<Vec<TextBlock>> {
    let bytes = doc
        .get_page_content(page_id)
        .map_err(|e| Error::PdfError(format!("Failed to read page content: {}", e)))?;
    let content = Content::decode(&bytes)
        .map_err(|e| Error::PdfError(format!("Failed to decode page content: {}", e)))?;
    let fonts = FontSet::for_page(doc, page_id);

    Ok(layout_operations(&content.operations, &fonts))
}

/// Run the text operators of a content stream.
pub fn layout_operations(operations: &[Operation], fonts: &FontSet) -> Vec<TextBlock> {
    let mut layout = Layout::new(fonts);
    for operation in operations {
        layout.apply(operation);
    }
    layout.finish()
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<String>,
    font_size: f64,
    leading: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            font: None,
            font_size: 0.0,
            leading: 0.0,
        }
    }
}

struct Layout<'a> {
    fonts: &'a FontSet,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    tm: Matrix,
    tlm: Matrix,
    moved: bool,
    blocks: Vec<TextBlock>,
    block: TextBlock,
    line: Option<TextLine>,
    span: Option<TextSpan>,
}

impl<'a> Layout<'a> {
    fn new(fonts: &'a FontSet) -> Self {
        Self {
            fonts,
            state: GraphicsState::default(),
            saved: Vec::new(),
            tm: IDENTITY,
            tlm: IDENTITY,
            moved: true,
            blocks: Vec::new(),
            block: TextBlock::default(),
            line: None,
            span: None,
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let operands = &operation.operands;
        let num = |i: usize| operands.get(i).and_then(number);

        match operation.operator.as_str() {
            "q" => self.saved.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = matrix(operands) {
                    self.state.ctm = multiply(&m, &self.state.ctm);
                }
            }
            "BT" => {
                self.flush_block();
                self.tm = IDENTITY;
                self.tlm = IDENTITY;
                self.moved = true;
            }
            "ET" => self.flush_block(),
            "Tf" => {
                if let Some(font) = operands.first().and_then(name) {
                    self.state.font = Some(font);
                }
                if let Some(size) = num(1) {
                    self.state.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = num(0) {
                    self.state.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix(operands) {
                    self.tm = m;
                    self.tlm = m;
                    self.moved = true;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(adjustment) = number(other) {
                                    self.adjust(adjustment);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.tlm);
        self.tm = self.tlm;
        self.moved = true;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn advance(&mut self, tx: f64) {
        self.tm = multiply(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.tm);
    }

    fn adjust(&mut self, adjustment: f64) {
        if adjustment < WORD_GAP_ADJUSTMENT {
            if let Some(span) = self.span.as_mut() {
                if !span.text.ends_with(' ') {
                    span.text.push(' ');
                }
            }
        }
        self.advance(-adjustment / 1000.0 * self.state.font_size);
    }

    fn show(&mut self, bytes: &[u8]) {
        let resource = self.state.font.clone().unwrap_or_default();
        let font = self.fonts.get(&resource);
        let text = match font {
            Some(font) => font.decode(bytes),
            None => bytes.iter().map(|&b| b as char).collect(),
        };
        let font_name = match font {
            Some(font) => font.name.clone(),
            None => resource,
        };

        let trm = multiply(&self.tm, &self.state.ctm);
        let size = round2(self.state.font_size * trm[2].hypot(trm[3]));

        let continues = !self.moved
            && self
                .span
                .as_ref()
                .map(|s| s.font_name == font_name && s.size == size)
                .unwrap_or(false);

        let glyphs = text.chars().count();
        if continues {
            if let Some(span) = self.span.as_mut() {
                span.text.push_str(&text);
            }
        } else {
            self.start_span(TextSpan {
                text,
                font_name,
                size,
                x: trm[4],
                y: trm[5],
            });
        }

        self.moved = false;
        self.advance(glyphs as f64 * self.state.font_size * GLYPH_WIDTH_RATIO);
    }

    fn start_span(&mut self, span: TextSpan) {
        self.flush_span();
        let new_line = self
            .line
            .as_ref()
            .and_then(TextLine::baseline)
            .map(|y| (y - span.y).abs() > LINE_TOLERANCE)
            .unwrap_or(false);
        if new_line {
            self.flush_line();
        }
        self.span = Some(span);
    }

    fn flush_span(&mut self) {
        if let Some(span) = self.span.take() {
            self.line.get_or_insert_with(TextLine::default).spans.push(span);
        }
    }

    fn flush_line(&mut self) {
        self.flush_span();
        if let Some(line) = self.line.take() {
            if !line.spans.is_empty() {
                self.block.lines.push(line);
            }
        }
    }

    fn flush_block(&mut self) {
        self.flush_line();
        let block = std::mem::take(&mut self.block);
        if !block.lines.is_empty() {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Vec<TextBlock> {
        self.flush_block();
        self.blocks
    }
}

fn matrix(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = [0.0; 6];
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(m)
}

/// `a × b` with PDF's row-vector convention.
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn layout(operations: Vec<Operation>) -> Vec<TextBlock> {
        layout_operations(&operations, &FontSet::default())
    }

    #[test]
    fn test_blocks_lines_and_spans() {
        let blocks = layout(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 16.into()]),
            op("Td", vec![72.into(), 720.into()]),
            op("Tj", vec![Object::string_literal("Intro")]),
            op("Tf", vec!["F1".into(), 11.into()]),
            op("Td", vec![0.into(), (-20).into()]),
            op("Tj", vec![Object::string_literal("Body ")]),
            op("Tj", vec![Object::string_literal("text")]),
            op("ET", vec![]),
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 11.into()]),
            op("Td", vec![72.into(), 100.into()]),
            op("Tj", vec![Object::string_literal("Footer")]),
            op("ET", vec![]),
        ]);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 2);

        let intro = &blocks[0].lines[0].spans[0];
        assert_eq!(intro.text, "Intro");
        assert_eq!(intro.size, 16.0);
        assert_eq!(intro.font_name, "F1");
        assert_eq!((intro.x, intro.y), (72.0, 720.0));

        let body = &blocks[0].lines[1].spans;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].text, "Body text");
        assert_eq!(body[0].y, 700.0);

        assert_eq!(blocks[1].lines[0].spans[0].text, "Footer");
    }

    #[test]
    fn test_text_matrix_scales_size() {
        let blocks = layout(vec![
            op("BT", vec![]),
            op("Tf", vec!["F2".into(), 1.into()]),
            op("Tm", vec![18.into(), 0.into(), 0.into(), 18.into(), 50.into(), 500.into()]),
            op("Tj", vec![Object::string_literal("Scaled")]),
            op("ET", vec![]),
        ]);

        let span = &blocks[0].lines[0].spans[0];
        assert_eq!(span.size, 18.0);
        assert_eq!((span.x, span.y), (50.0, 500.0));
    }

    #[test]
    fn test_tj_array_word_gap() {
        let blocks = layout(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hel"),
                    (-20).into(),
                    Object::string_literal("lo"),
                    (-300).into(),
                    Object::string_literal("world"),
                ])],
            ),
            op("ET", vec![]),
        ]);

        assert_eq!(blocks[0].lines[0].spans[0].text, "Hello world");
    }

    #[test]
    fn test_leading_and_next_line() {
        let blocks = layout(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("TL", vec![12.into()]),
            op("Td", vec![10.into(), 200.into()]),
            op("Tj", vec![Object::string_literal("one")]),
            op("'", vec![Object::string_literal("two")]),
            op("T*", vec![]),
            op("Tj", vec![Object::string_literal("three")]),
            op("ET", vec![]),
        ]);

        let ys: Vec<f64> = blocks[0].lines.iter().filter_map(TextLine::baseline).collect();
        assert_eq!(ys, vec![200.0, 188.0, 176.0]);
    }

    #[test]
    fn test_same_baseline_moves_split_spans() {
        let blocks = layout(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![50.into(), 300.into()]),
            op("Tj", vec![Object::string_literal("Name")]),
            op("Td", vec![150.into(), 0.into()]),
            op("Tj", vec![Object::string_literal("Qty")]),
            op("ET", vec![]),
        ]);

        let line = &blocks[0].lines[0];
        assert_eq!(line.spans.len(), 2);
        assert_eq!(line.spans[1].x, 200.0);
    }

    #[test]
    fn test_graphics_state_restores_font() {
        let blocks = layout(vec![
            op("Tf", vec!["F1".into(), 10.into()]),
            op("q", vec![]),
            op("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()]),
            op("BT", vec![]),
            op("Tj", vec![Object::string_literal("big")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tj", vec![Object::string_literal("small")]),
            op("ET", vec![]),
        ]);

        assert_eq!(blocks[0].lines[0].spans[0].size, 20.0);
        assert_eq!(blocks[1].lines[0].spans[0].size, 10.0);
    }

    #[test]
    fn test_page_blocks_decode_win_ansi_font() {
        use lopdf::{dictionary, Stream};

        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Calibri",
            "Encoding" => "WinAnsiEncoding",
        });
        let operations = vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 11.into()]),
            op("Td", vec![72.into(), 720.into()]),
            op("Tj", vec![Object::string_literal(b"It\x92s \x96 ok".to_vec())]),
            op("ET", vec![]),
        ];
        let content = Content { operations }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });

        let blocks = page_blocks(&doc, page_id).unwrap();
        let span = &blocks[0].lines[0].spans[0];
        assert_eq!(span.text, "It\u{2019}s \u{2013} ok");
        assert_eq!(span.font_name, "Calibri");
    }
}
