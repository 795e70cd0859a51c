//! Per-actor aggregation of statement counts and numeric means.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use xapi_core::error::{Result, XapiError};

use crate::frame::{Cell, StatementFrame, ACTOR, VERB};

/// Column name given to the per-actor statement count.
pub const COUNT: &str = "count";

// ── MeanAccumulator ───────────────────────────────────────────────────────────

/// Running sum and count for one group's mean.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// The mean, or `None` when nothing numeric was accumulated.
    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

impl StatementFrame {
    /// Count the statements of each actor.
    ///
    /// Returns a fresh two-column frame ([`ACTOR`], [`COUNT`]) with one
    /// row per distinct actor, sorted by ascending count; actors with
    /// equal counts stay in alphabetical order. A count tallies the
    /// group's non-null verb cells, and rows with a null actor are left
    /// out entirely.
    pub fn count_interactions(&self) -> Result<StatementFrame> {
        let actor_idx = self.column_index(ACTOR)?;
        let verb_idx = self.column_index(VERB)?;

        // BTreeMap iteration fixes the alphabetical tie order.
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for row in &self.rows {
            let Some(actor) = row[actor_idx].render() else {
                continue;
            };
            let count = counts.entry(actor).or_insert(0);
            if !row[verb_idx].is_null() {
                *count += 1;
            }
        }

        let mut pairs: Vec<(String, u64)> = counts.into_iter().collect();
        pairs.sort_by_key(|(_, count)| *count);

        let mut out = StatementFrame::new([ACTOR, COUNT]);
        for (actor, count) in pairs {
            out.rows
                .push(vec![Cell::Text(actor), Cell::Number(count as f64)]);
        }
        Ok(out)
    }

    /// Mean of a numeric column grouped by actor. See
    /// [`average_interactions_by`](Self::average_interactions_by).
    pub fn average_interactions(&self, avg_column: &str) -> Result<StatementFrame> {
        self.average_interactions_by(avg_column, ACTOR)
    }

    /// Mean of a numeric column per group.
    ///
    /// Returns a fresh two-column frame (`group_column`, `avg_column`)
    /// with one row per distinct group key, sorted by ascending mean.
    /// Null cells take no part in a group's mean; a group with no numeric
    /// cells at all gets a null mean and sorts after every numeric one.
    /// A text cell in the averaged column is an error.
    pub fn average_interactions_by(
        &self,
        avg_column: &str,
        group_column: &str,
    ) -> Result<StatementFrame> {
        let group_idx = self.column_index(group_column)?;
        let avg_idx = self.column_index(avg_column)?;

        let mut groups: BTreeMap<String, MeanAccumulator> = BTreeMap::new();
        for row in &self.rows {
            let Some(key) = row[group_idx].render() else {
                continue;
            };
            let acc = groups.entry(key).or_default();
            match &row[avg_idx] {
                Cell::Number(value) => acc.add(*value),
                Cell::Null => {}
                Cell::Text(_) => {
                    return Err(XapiError::ColumnType {
                        column: avg_column.to_string(),
                        expected: "a numeric column",
                    })
                }
            }
        }

        let mut means: Vec<(String, Option<f64>)> = groups
            .into_iter()
            .map(|(key, acc)| (key, acc.mean()))
            .collect();
        means.sort_by(|a, b| match (a.1, b.1) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let mut out = StatementFrame::new([group_column, avg_column]);
        for (key, mean) in means {
            let cell = match mean {
                Some(value) => Cell::Number(value),
                None => Cell::Null,
            };
            out.rows.push(vec![Cell::Text(key), cell]);
        }
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::OBJECT;

    fn frame(rows: &[(&str, &str)]) -> StatementFrame {
        let mut frame = StatementFrame::new([ACTOR, VERB]);
        for (actor, verb) in rows {
            frame
                .push_row(vec![Cell::text(*actor), Cell::text(*verb)])
                .unwrap();
        }
        frame
    }

    fn scored(rows: &[(&str, Cell)]) -> StatementFrame {
        let mut frame = StatementFrame::new([ACTOR, "score"]);
        for (actor, score) in rows {
            frame
                .push_row(vec![Cell::text(*actor), score.clone()])
                .unwrap();
        }
        frame
    }

    // ── count_interactions ───────────────────────────────────────────────────

    #[test]
    fn test_count_orders_ascending() {
        let f = frame(&[
            ("alice", "completed"),
            ("bob", "attempted"),
            ("alice", "passed"),
        ]);
        let out = f.count_interactions().unwrap();

        assert_eq!(out.columns(), [ACTOR, COUNT]);
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows()[0], vec![Cell::text("bob"), Cell::Number(1.0)]);
        assert_eq!(out.rows()[1], vec![Cell::text("alice"), Cell::Number(2.0)]);
    }

    #[test]
    fn test_count_totals_match_row_count() {
        let f = frame(&[
            ("alice", "completed"),
            ("bob", "attempted"),
            ("carol", "passed"),
            ("alice", "failed"),
            ("bob", "launched"),
        ]);
        let out = f.count_interactions().unwrap();

        let total: f64 = out
            .rows()
            .iter()
            .filter_map(|row| row[1].as_number())
            .sum();
        assert_eq!(total, f.row_count() as f64);
    }

    #[test]
    fn test_count_ties_stay_alphabetical() {
        let f = frame(&[("dora", "completed"), ("alice", "attempted")]);
        let out = f.count_interactions().unwrap();

        assert_eq!(out.rows()[0][0], Cell::text("alice"));
        assert_eq!(out.rows()[1][0], Cell::text("dora"));
    }

    #[test]
    fn test_count_ignores_null_verbs_but_keeps_the_actor() {
        let mut f = StatementFrame::new([ACTOR, VERB]);
        f.push_row(vec![Cell::text("alice"), Cell::text("completed")])
            .unwrap();
        f.push_row(vec![Cell::text("bob"), Cell::Null]).unwrap();

        let out = f.count_interactions().unwrap();
        // bob has no countable verbs, so he sorts first with zero.
        assert_eq!(out.rows()[0], vec![Cell::text("bob"), Cell::Number(0.0)]);
        assert_eq!(out.rows()[1], vec![Cell::text("alice"), Cell::Number(1.0)]);
    }

    #[test]
    fn test_count_drops_null_actors() {
        let mut f = StatementFrame::new([ACTOR, VERB]);
        f.push_row(vec![Cell::Null, Cell::text("completed")]).unwrap();
        f.push_row(vec![Cell::text("alice"), Cell::text("passed")])
            .unwrap();

        let out = f.count_interactions().unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows()[0][0], Cell::text("alice"));
    }

    #[test]
    fn test_count_empty_frame_yields_empty_output() {
        let out = frame(&[]).count_interactions().unwrap();
        assert_eq!(out.columns(), [ACTOR, COUNT]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_count_without_verb_column_fails() {
        let f = StatementFrame::new([ACTOR, OBJECT]);
        assert!(f.count_interactions().is_err());
    }

    // ── average_interactions ─────────────────────────────────────────────────

    #[test]
    fn test_average_single_row_group_is_exact() {
        let f = scored(&[("alice", Cell::Number(7.5))]);
        let out = f.average_interactions("score").unwrap();

        assert_eq!(out.columns(), [ACTOR, "score"]);
        assert_eq!(out.rows()[0], vec![Cell::text("alice"), Cell::Number(7.5)]);
    }

    #[test]
    fn test_average_orders_ascending_by_mean() {
        let f = scored(&[
            ("bob", Cell::Number(10.0)),
            ("alice", Cell::Number(2.0)),
            ("alice", Cell::Number(4.0)),
        ]);
        let out = f.average_interactions("score").unwrap();

        assert_eq!(out.rows()[0], vec![Cell::text("alice"), Cell::Number(3.0)]);
        assert_eq!(out.rows()[1], vec![Cell::text("bob"), Cell::Number(10.0)]);
    }

    #[test]
    fn test_average_skips_null_cells() {
        let f = scored(&[
            ("alice", Cell::Number(2.0)),
            ("alice", Cell::Null),
            ("alice", Cell::Number(4.0)),
        ]);
        let out = f.average_interactions("score").unwrap();
        assert_eq!(out.rows()[0][1], Cell::Number(3.0));
    }

    #[test]
    fn test_average_all_null_group_sorts_last() {
        let f = scored(&[
            ("zoe", Cell::Number(1.0)),
            ("alice", Cell::Null),
        ]);
        let out = f.average_interactions("score").unwrap();

        assert_eq!(out.rows()[0][0], Cell::text("zoe"));
        assert_eq!(out.rows()[1][0], Cell::text("alice"));
        assert!(out.rows()[1][1].is_null());
    }

    #[test]
    fn test_average_text_cell_fails() {
        let f = scored(&[("alice", Cell::text("high"))]);
        let err = f.average_interactions("score").unwrap_err();
        assert_eq!(err.to_string(), "Column score is not a numeric column");
    }

    #[test]
    fn test_average_drops_null_group_keys() {
        let mut f = StatementFrame::new([ACTOR, "score"]);
        f.push_row(vec![Cell::Null, Cell::Number(5.0)]).unwrap();
        f.push_row(vec![Cell::text("alice"), Cell::Number(1.0)])
            .unwrap();

        let out = f.average_interactions("score").unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows()[0][0], Cell::text("alice"));
    }

    #[test]
    fn test_average_custom_group_column() {
        let mut f = StatementFrame::new([ACTOR, VERB, "score"]);
        f.push_row(vec![
            Cell::text("alice"),
            Cell::text("completed"),
            Cell::Number(4.0),
        ])
        .unwrap();
        f.push_row(vec![
            Cell::text("bob"),
            Cell::text("completed"),
            Cell::Number(2.0),
        ])
        .unwrap();
        f.push_row(vec![
            Cell::text("alice"),
            Cell::text("attempted"),
            Cell::Number(9.0),
        ])
        .unwrap();

        let out = f.average_interactions_by("score", VERB).unwrap();
        assert_eq!(out.columns(), [VERB, "score"]);
        assert_eq!(
            out.rows()[0],
            vec![Cell::text("completed"), Cell::Number(3.0)]
        );
        assert_eq!(
            out.rows()[1],
            vec![Cell::text("attempted"), Cell::Number(9.0)]
        );
    }

    #[test]
    fn test_average_unknown_columns_fail() {
        let f = scored(&[("alice", Cell::Number(1.0))]);
        assert!(f.average_interactions("rating").is_err());
        assert!(f.average_interactions_by("score", "team").is_err());
    }
}
