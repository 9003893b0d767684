//! Core domain types, extraction traits, and output layout for office
//! document extraction.

pub mod assets;
pub mod error;
pub mod extract;
pub mod layout;
pub mod types;

pub use error::{Error, Result};
pub use extract::{Extractor, Loader};
pub use layout::{document_base_name, AssetDirs, OutputLayout, DEFAULT_OUTPUT_ROOT};
pub use types::{
    DocumentFormat, ExtractedImage, ExtractedTable, ExtractionResult, FontRun, Link, PageMap,
    TextExtraction, TextMetadata,
};
