//! Row filters and column normalization over a statement frame.

use tracing::warn;

use xapi_core::error::{Result, XapiError};

use crate::frame::{Cell, StatementFrame, ACTOR, VERB};

/// Separator used by [`StatementFrame::split_column`].
pub const DEFAULT_SEPARATOR: &str = ";";

impl StatementFrame {
    // ── Normalization ─────────────────────────────────────────────────────────

    /// Remove every space character from the text cells of the named
    /// columns, in place, returning the frame again so calls chain.
    ///
    /// A named column holding numeric cells is an error; null cells pass
    /// through untouched.
    pub fn remove_whitespaces(&mut self, columns: &[&str]) -> Result<&mut Self> {
        let indexes = self.text_column_indexes(columns)?;
        for row in &mut self.rows {
            for &idx in &indexes {
                if let Cell::Text(s) = &mut row[idx] {
                    *s = s.replace(' ', "");
                }
            }
        }
        Ok(self)
    }

    /// Lowercase the text cells of the named columns, in place, returning
    /// the frame again so calls chain.
    ///
    /// Only text cells are touched; numeric and null cells are left as
    /// they are.
    pub fn to_lowercase(&mut self, columns: &[&str]) -> Result<&mut Self> {
        let indexes = self.column_indexes(columns)?;
        for row in &mut self.rows {
            for &idx in &indexes {
                if let Cell::Text(s) = &mut row[idx] {
                    *s = s.to_lowercase();
                }
            }
        }
        Ok(self)
    }

    // ── Row filters ───────────────────────────────────────────────────────────

    /// A new frame without the rows whose actor is in `actors`.
    ///
    /// Rows whose actor cell is null or numeric never match an exclusion
    /// name and are kept. Applying the same exclusion twice changes
    /// nothing.
    pub fn remove_actors(&self, actors: &[&str]) -> Result<StatementFrame> {
        let idx = self.column_index(ACTOR)?;
        Ok(self.retain_rows(|row| match row[idx].as_text() {
            Some(value) => !actors.contains(&value),
            None => true,
        }))
    }

    /// A new frame without the rows whose verb is in `verbs`.
    pub fn remove_verbs(&self, verbs: &[&str]) -> Result<StatementFrame> {
        let idx = self.column_index(VERB)?;
        Ok(self.retain_rows(|row| match row[idx].as_text() {
            Some(value) => !verbs.contains(&value),
            None => true,
        }))
    }

    /// A new frame holding only the rows where the actor and the verb
    /// both match exactly.
    pub fn subset_actor_verb(&self, actor: &str, verb: &str) -> Result<StatementFrame> {
        let actor_idx = self.column_index(ACTOR)?;
        let verb_idx = self.column_index(VERB)?;
        Ok(self.retain_rows(|row| {
            row[actor_idx].as_text() == Some(actor) && row[verb_idx].as_text() == Some(verb)
        }))
    }

    // ── Column splitting ──────────────────────────────────────────────────────

    /// Split a text column on [`DEFAULT_SEPARATOR`] into one new frame
    /// with the given column names. See [`split_column_on`](Self::split_column_on).
    pub fn split_column(&self, column: &str, names: &[&str]) -> Result<StatementFrame> {
        self.split_column_on(column, names, DEFAULT_SEPARATOR)
    }

    /// Split a text column on `separator` into one new frame with the
    /// given column names.
    ///
    /// The new frame is as wide as the row that splits into the most
    /// parts; shorter rows are padded with null cells, and rows whose
    /// source cell is not text become all-null rows. If the produced
    /// width differs from the number of supplied names, the mismatch is
    /// logged and an empty frame is returned rather than an error.
    pub fn split_column_on(
        &self,
        column: &str,
        names: &[&str],
        separator: &str,
    ) -> Result<StatementFrame> {
        let idx = self.column_index(column)?;

        let mut split_rows: Vec<Vec<Cell>> = Vec::with_capacity(self.rows.len());
        let mut width = 0;
        for row in &self.rows {
            let parts: Vec<Cell> = match row[idx].as_text() {
                Some(text) => text.split(separator).map(Cell::text).collect(),
                None => Vec::new(),
            };
            width = width.max(parts.len());
            split_rows.push(parts);
        }

        if width != names.len() {
            warn!(
                "split of column \"{}\" produced {} columns but {} names were given, returning an empty table",
                column,
                width,
                names.len()
            );
            return Ok(StatementFrame::empty());
        }

        let mut out = StatementFrame::new(names.iter().copied());
        for mut parts in split_rows {
            parts.resize(width, Cell::Null);
            out.rows.push(parts);
        }
        Ok(out)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Copy the frame keeping only the rows `keep` accepts.
    fn retain_rows(&self, keep: impl Fn(&[Cell]) -> bool) -> StatementFrame {
        StatementFrame {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Resolve column names to positions.
    fn column_indexes(&self, columns: &[&str]) -> Result<Vec<usize>> {
        columns.iter().map(|name| self.column_index(name)).collect()
    }

    /// Resolve column names to positions, checking that none of the
    /// columns carries numeric cells.
    fn text_column_indexes(&self, columns: &[&str]) -> Result<Vec<usize>> {
        let mut indexes = Vec::with_capacity(columns.len());
        for name in columns {
            let idx = self.column_index(name)?;
            if self.rows.iter().any(|row| row[idx].as_number().is_some()) {
                return Err(XapiError::ColumnType {
                    column: (*name).to_string(),
                    expected: "a text column",
                });
            }
            indexes.push(idx);
        }
        Ok(indexes)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
