//! SQLite sink.

use std::path::Path;

use docmine_core::ExtractionResult;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::Sink;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "extracted_data.db";

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS documents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_name TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS document_text (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        content TEXT,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );

    CREATE TABLE IF NOT EXISTS document_headings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        heading TEXT,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );

    CREATE TABLE IF NOT EXISTS document_links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        url TEXT,
        link_text TEXT,
        shape_name TEXT,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );

    CREATE TABLE IF NOT EXISTS document_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        image_path TEXT,
        alt_text TEXT,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );

    CREATE TABLE IF NOT EXISTS document_tables (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        table_data TEXT,
        table_path TEXT,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );

    CREATE TABLE IF NOT EXISTS document_font_styles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        document_id INTEGER,
        page_number INTEGER,
        text_content TEXT,
        font_name TEXT,
        font_size REAL,
        FOREIGN KEY(document_id) REFERENCES documents(id)
    );
";

/// Stores each document as one `documents` row plus detail rows, inside a
/// single transaction.
pub struct SqlSink {
    conn: Connection,
}

impl SqlSink {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let sink = Self {
            conn: Connection::open(path)?,
        };
        sink.init_schema()?;
        log::info!("Database opened at {}", path.display());
        Ok(sink)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let sink = Self {
            conn: Connection::open_in_memory()?,
        };
        sink.init_schema()?;
        Ok(sink)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert one document and all of its detail rows, returning the new
    /// document id. Nothing is kept if any insert fails.
    pub fn insert_document(&mut self, result: &ExtractionResult, file_name: &str) -> Result<i64> {
        let tx = self.conn.transaction()?;

        match insert_rows(&tx, result, file_name) {
            Ok(document_id) => {
                tx.commit()?;
                Ok(document_id)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    log::error!("Rollback failed for '{}': {}", file_name, rollback);
                }
                Err(e)
            }
        }
    }
}

impl Sink for SqlSink {
    fn save(&mut self, result: &ExtractionResult, file_name: &str) -> Result<()> {
        match self.insert_document(result, file_name) {
            Ok(document_id) => {
                log::info!(
                    "Saved data for '{}' as document {}",
                    file_name,
                    document_id
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Error saving data for '{}' to database: {}", file_name, e);
                Err(e)
            }
        }
    }
}

fn insert_rows(conn: &Connection, result: &ExtractionResult, file_name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO documents (file_name) VALUES (?1)",
        params![file_name],
    )?;
    let document_id = conn.last_insert_rowid();

    for (page, lines) in &result.text_by_page {
        conn.execute(
            "INSERT INTO document_text (document_id, page_number, content) VALUES (?1, ?2, ?3)",
            params![document_id, page, lines.join("\n")],
        )?;
    }

    for (page, headings) in &result.headings_by_page {
        for heading in headings {
            conn.execute(
                "INSERT INTO document_headings (document_id, page_number, heading)
                 VALUES (?1, ?2, ?3)",
                params![document_id, page, heading],
            )?;
        }
    }

    for link in &result.links {
        conn.execute(
            "INSERT INTO document_links (document_id, page_number, url, link_text, shape_name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![document_id, link.page_number, link.url, link.text, link.shape_name],
        )?;
    }

    for image in &result.images {
        conn.execute(
            "INSERT INTO document_images (document_id, page_number, image_path, alt_text)
             VALUES (?1, ?2, ?3, ?4)",
            params![document_id, image.page_number, image.image_path, image.alt_text],
        )?;
    }

    for table in &result.tables {
        let table_data = serde_json::to_string(&table.table_data)?;
        conn.execute(
            "INSERT INTO document_tables (document_id, page_number, table_data, table_path)
             VALUES (?1, ?2, ?3, ?4)",
            params![document_id, table.page_number, table_data, table.table_path],
        )?;
    }

    for run in &result.font_runs {
        conn.execute(
            "INSERT INTO document_font_styles
                 (document_id, page_number, text_content, font_name, font_size)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![document_id, run.page_number, run.text, run.font_name, run.font_size],
        )?;
    }

    Ok(document_id)
}
