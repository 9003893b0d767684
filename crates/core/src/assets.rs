//! Writing extracted assets (image payloads and table CSVs) to disk.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Write raw bytes, creating the parent directory if needed.
pub fn write_asset(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Write a cell matrix as CSV. Rows of differing length are written as-is.
pub fn write_table_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    ensure_parent(path)?;

    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    log::debug!("Wrote {} table rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a CSV written by [`write_table_csv`], trimming every cell.
pub fn read_table_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    Ok(rows)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
