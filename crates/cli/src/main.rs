//! CLI tool for extracting text, links, images and tables from office documents.

mod pipeline;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docmine_core::{ExtractionResult, OutputLayout, DEFAULT_OUTPUT_ROOT};
use docmine_storage::sql::DEFAULT_DB_PATH;
use docmine_storage::{FileSink, Sink, SqlSink};
use std::path::PathBuf;

/// Where extraction results are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Text and CSV files under the output directory
    File,
    /// Rows in a SQLite database
    Sql,
    /// Both of the above
    All,
}

/// Extract text, links, images and tables from PDF, DOCX and PPTX files.
#[derive(Parser, Debug)]
#[command(name = "docmine")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input document (.pdf, .docx or .pptx)
    #[arg(default_value = "data/sample.docx")]
    input: PathBuf,

    /// Output root for extracted files, images and tables
    #[arg(short, long, default_value = DEFAULT_OUTPUT_ROOT)]
    output: PathBuf,

    /// Storage backend(s) for the extraction result
    #[arg(long, value_enum, default_value_t = SinkKind::File)]
    sink: SinkKind,

    /// SQLite database path for the sql sink
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Print the extraction result as JSON to stdout
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let layout = OutputLayout::new(&args.output);

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let (file_name, result) = pipeline::process_file(&args.input, &layout)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    if args.print {
        let json = serde_json::to_string_pretty(&result).context("Failed to encode result")?;
        println!("{}", json);
    }

    save_result(&result, &file_name, &args, &layout)
}

/// Run every selected sink. A failing sink does not stop the others.
fn save_result(
    result: &ExtractionResult,
    file_name: &str,
    args: &Args,
    layout: &OutputLayout,
) -> Result<()> {
    let mut failures = Vec::new();

    if matches!(args.sink, SinkKind::File | SinkKind::All) {
        let mut sink = FileSink::new(layout.clone());
        match sink.save(result, file_name) {
            Ok(()) => {
                if args.verbose {
                    eprintln!("Written to: {}", layout.document_dir(file_name).display());
                }
            }
            Err(e) => failures.push(format!("file sink: {}", e)),
        }
    }

    if matches!(args.sink, SinkKind::Sql | SinkKind::All) {
        match SqlSink::open(&args.db).and_then(|mut sink| sink.save(result, file_name)) {
            Ok(()) => {
                if args.verbose {
                    eprintln!("Saved to database: {}", args.db.display());
                }
            }
            Err(e) => failures.push(format!("sql sink ({}): {}", args.db.display(), e)),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Failed to save {}: {}",
            file_name,
            failures.join("; ")
        ))
    }
}
