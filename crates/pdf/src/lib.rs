//! PDF backend.
//!
//! Walks the lopdf object tree page by page: content streams are laid out into
//! blocks, lines and spans; link annotations, image XObjects and span-aligned
//! tables are mapped into the unified extraction model.

pub mod annotations;
pub mod content;
pub mod document;
pub mod encoding;
pub mod extractor;
pub mod fonts;
pub mod images;
pub mod loader;
pub mod objects;
pub mod table;

pub use content::{TextBlock, TextLine, TextSpan};
pub use document::PdfDocument;
pub use extractor::{PdfExtractor, HEADING_MIN_SIZE};
pub use loader::PdfLoader;
