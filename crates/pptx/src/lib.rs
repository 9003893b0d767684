//! PPTX (Office Open XML) backend.
//!
//! Parses .pptx files, which are ZIP archives containing XML documents, into
//! a slide/shape tree and maps it into the unified extraction model.

pub mod extractor;
pub mod loader;
pub mod model;
pub mod parser;

pub use extractor::PptxExtractor;
pub use loader::PptxLoader;
pub use model::{PptxDocument, Shape, ShapeKind, Slide};
pub use parser::PptxParser;
