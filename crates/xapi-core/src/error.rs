use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the xAPI statement and table layers.
#[derive(Error, Debug)]
pub enum XapiError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timestamp string did not match the xAPI storage format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A required field is absent from the statement document.
    #[error("Field not found: {0}")]
    MissingField(String),

    /// A statement field holds a value of an unexpected type.
    #[error("Field {path} is not {expected}")]
    FieldType { path: String, expected: &'static str },

    /// A named column does not exist in the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column holds cells of a type the operation cannot work on.
    #[error("Column {column} is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// A row was pushed with a cell count that does not match the table width.
    #[error("Row has {got} cells, expected {expected}")]
    RowWidth { expected: usize, got: usize },

    /// A CSV file could not be read or decoded.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the xAPI crates.
pub type Result<T> = std::result::Result<T, XapiError>;
