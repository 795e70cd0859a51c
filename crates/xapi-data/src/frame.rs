//! Row/column table of statement fields used by the analysis operations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use xapi_core::error::{Result, XapiError};

/// Column name for the statement actor.
pub const ACTOR: &str = "actor";
/// Column name for the statement verb.
pub const VERB: &str = "verb";
/// Column name for the statement object.
pub const OBJECT: &str = "object";

// ── Cell ──────────────────────────────────────────────────────────────────────

/// One table cell.
///
/// Serializes untagged, so a frame round-trips through plain JSON scalars:
/// strings, numbers and nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// The cell's text, if it is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The cell's number, if it is a numeric cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Rendered form used for distinct-value sets and group keys.
    ///
    /// Text renders as-is, numbers through their display form, and null
    /// cells render as `None` so groupings drop them.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format!("{}", n)),
            Cell::Null => None,
        }
    }
}

// ── StatementFrame ────────────────────────────────────────────────────────────

/// A table with named columns and one row per statement.
///
/// The canonical analysis frame carries the columns [`ACTOR`], [`VERB`]
/// and [`OBJECT`], but any column layout is accepted; operations that
/// need a specific column look it up by name and fail if it is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementFrame {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl<'de> Deserialize<'de> for StatementFrame {
    /// Deserializes through [`StatementFrame::push_row`] so a row whose
    /// cell count differs from the column count is rejected instead of
    /// producing a frame that panics on column access.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            columns: Vec<String>,
            rows: Vec<Vec<Cell>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut frame = StatementFrame::new(raw.columns);
        for row in raw.rows {
            frame.push_row(row).map_err(serde::de::Error::custom)?;
        }
        Ok(frame)
    }
}

impl StatementFrame {
    /// A frame with the given column names and no rows.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// A frame with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append one row. The cell count must match the column count.
    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(XapiError::RowWidth {
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| XapiError::ColumnNotFound(name.to_string()))
    }

    /// All cells of a named column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    // ── Distinct values ───────────────────────────────────────────────────────

    /// The set of distinct rendered values in a column. Null cells are
    /// not part of the set.
    pub fn distinct_values(&self, column: &str) -> Result<HashSet<String>> {
        let idx = self.column_index(column)?;
        let mut values = HashSet::new();
        for row in &self.rows {
            if let Some(text) = row[idx].render() {
                values.insert(text);
            }
        }
        Ok(values)
    }

    /// Every distinct actor in the frame.
    pub fn all_actors(&self) -> Result<HashSet<String>> {
        self.distinct_values(ACTOR)
    }

    /// Every distinct verb in the frame.
    pub fn all_verbs(&self) -> Result<HashSet<String>> {
        self.distinct_values(VERB)
    }

    /// Every distinct object in the frame.
    pub fn all_objects(&self) -> Result<HashSet<String>> {
        self.distinct_values(OBJECT)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
