//! Office Open XML package access shared by the DOCX and PPTX backends.
//!
//! Both formats are ZIP archives of XML parts linked by relationship tables.

pub mod package;
pub mod relationships;
pub mod xml;

pub use package::{rels_path_for, resolve_target, Package};
pub use relationships::{Relationship, Relationships};
pub use xml::{attr, local_name, rel_id};
