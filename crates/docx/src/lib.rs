//! DOCX (Office Open XML) backend.
//!
//! Reads the main document part, its relationships and the style sheet into a
//! paragraph/table collection and maps it into the unified extraction model.

pub mod extractor;
pub mod loader;
pub mod model;
pub mod parser;

pub use extractor::DocxExtractor;
pub use loader::DocxLoader;
pub use model::{DocxDocument, ImagePart, Paragraph, Run, Table};
pub use parser::{DocxParser, StyleSheet};
