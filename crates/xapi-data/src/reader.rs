//! CSV and statement-file ingestion.
//!
//! Builds analysis frames out of exported CSV tables and loads batches of
//! stored statement documents from a directory tree.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use xapi_core::error::{Result, XapiError};
use xapi_core::statement::Statement;

use crate::frame::{Cell, StatementFrame};

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a headered CSV file into a frame.
///
/// Cell typing is inferred per field: values that parse as a number
/// become numeric cells, empty fields become null cells, everything else
/// stays text. A missing path is not an error: it logs a warning and
/// yields the empty frame. A file that exists but cannot be decoded does
/// fail.
pub fn import_csv(path: &Path) -> Result<StatementFrame> {
    if !path.exists() {
        warn!("CSV file {} does not exist", path.display());
        return Ok(StatementFrame::empty());
    }

    let mut reader =
        csv::Reader::from_path(path).map_err(|e| XapiError::CsvParse(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| XapiError::CsvParse(e.to_string()))?
        .clone();
    let mut frame = StatementFrame::new(headers.iter());

    for record in reader.records() {
        let record = record.map_err(|e| XapiError::CsvParse(e.to_string()))?;
        let row: Vec<Cell> = record.iter().map(parse_cell).collect();
        frame.push_row(row)?;
    }

    debug!(
        "Imported {} rows from {}",
        frame.row_count(),
        path.display()
    );
    Ok(frame)
}

/// Find all `.json` statement files recursively under `dir`, sorted by path.
pub fn find_statement_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Statement path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every `.json` statement document under `dir`, in path order.
///
/// Files that cannot be read or parsed are skipped with a warning, so one
/// bad record does not abort a batch import. Documents that turn out
/// empty are dropped as well.
pub fn load_statements(dir: &Path) -> Vec<Statement> {
    let files = find_statement_files(dir);

    let mut statements: Vec<Statement> = Vec::new();
    for path in &files {
        match Statement::from_file(path) {
            Ok(statement) => {
                if statement.is_empty() {
                    warn!("Skipping empty statement file {}", path.display());
                } else {
                    statements.push(statement);
                }
            }
            Err(e) => {
                warn!("Skipping statement file {}: {}", path.display(), e);
            }
        }
    }

    debug!(
        "Loaded {} statements from {} files",
        statements.len(),
        files.len()
    );
    statements
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Infer one cell from a raw CSV field.
fn parse_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(number) => Cell::Number(number),
        Err(_) => Cell::Text(field.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
