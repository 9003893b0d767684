//! Output directory layout.
//!
//! Nothing here touches the filesystem; directories are created by the code
//! that writes into them.

use std::path::{Path, PathBuf};

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "output";

/// Root of all extraction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_ROOT)
    }
}

impl OutputLayout {
    /// Create a layout rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<base_name>`, holding the flat-file sink output.
    pub fn document_dir(&self, base_name: &str) -> PathBuf {
        self.root.join(base_name)
    }

    /// `<root>/<base_name>/images`
    pub fn images_dir(&self, base_name: &str) -> PathBuf {
        self.document_dir(base_name).join("images")
    }

    /// `<root>/tables/<base_name>`
    pub fn tables_dir(&self, base_name: &str) -> PathBuf {
        self.root.join("tables").join(base_name)
    }

    /// Asset directories for one document.
    pub fn assets_for(&self, base_name: &str) -> AssetDirs {
        AssetDirs {
            images: self.images_dir(base_name),
            tables: self.tables_dir(base_name),
        }
    }
}

/// Where an extractor writes image payloads and table CSVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDirs {
    pub images: PathBuf,
    pub tables: PathBuf,
}

impl AssetDirs {
    pub fn new(images: impl Into<PathBuf>, tables: impl Into<PathBuf>) -> Self {
        Self {
            images: images.into(),
            tables: tables.into(),
        }
    }

    pub fn image_path(&self, file_name: &str) -> PathBuf {
        self.images.join(file_name)
    }

    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.tables.join(file_name)
    }
}

/// Base name of a source document: file name without directory or extension.
pub fn document_base_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}
