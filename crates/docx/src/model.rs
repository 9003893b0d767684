//! Parsed paragraph/table/relationship collection of a Word document.

use docmine_ooxml::Relationships;

/// Style name used when a paragraph names no style and styles.xml declares no default.
pub const DEFAULT_STYLE_NAME: &str = "Normal";

/// A loaded Word document.
#[derive(Debug, Clone, Default)]
pub struct DocxDocument {
    /// Top-level body paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,
    /// Top-level body tables in document order.
    pub tables: Vec<Table>,
    /// Relationships of the main document part.
    pub relationships: Relationships,
    /// Parts targeted by image relationships, in relationship order.
    pub images: Vec<ImagePart>,
}

/// A body paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Display name of the paragraph style.
    pub style_name: String,
    pub text: String,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn is_heading(&self) -> bool {
        self.style_name.starts_with("Heading")
    }
}

/// A text run, possibly inside a hyperlink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    /// Relationship id of the enclosing `w:hyperlink`.
    pub hyperlink_id: Option<String>,
}

/// Rows of trimmed cell text.
pub type Table = Vec<Vec<String>>;

/// Binary payload behind an image relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub rel_id: String,
    /// Relationship target as written, used for the file extension.
    pub target: String,
    /// `None` for externally linked images.
    pub bytes: Option<Vec<u8>>,
}

impl ImagePart {
    /// Extension of the target, lowercased; `bin` when it has none.
    pub fn extension(&self) -> String {
        self.target
            .rsplit('/')
            .next()
            .and_then(|file| file.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }
}
