//! Grid validation: every row in a range against every column pair
//!
//! A run either completes with the full mismatch list, or fails before any
//! cell is compared (bad range, unknown column, bad tolerance). Individual
//! cells never abort a run; their problems show up as reason codes.

use crate::classify::classify;
use crate::config::{ColumnPair, RunConfig, Tolerance};
use crate::equivalence::{compare_classified, ReasonCode};
use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Inclusive range of data rows, checked against a table on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    start: usize,
    end: usize,
}

impl RowRange {
    /// Create a range, requiring `start <= end <= last row index`
    pub fn new(start: usize, end: usize, table: &Table) -> Result<Self> {
        let range = Self { start, end };
        range.check(table)?;
        Ok(range)
    }

    /// Every data row of the table
    pub fn full(table: &Table) -> Result<Self> {
        let end = table.last_row_index().ok_or(Error::InvalidRowRange {
            start: 0,
            end: 0,
            row_count: 0,
        })?;
        Ok(Self { start: 0, end })
    }

    /// First row, inclusive
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last row, inclusive
    pub fn end(&self) -> usize {
        self.end
    }

    fn row_count(&self) -> usize {
        self.end - self.start + 1
    }

    fn check(&self, table: &Table) -> Result<()> {
        if self.start > self.end || self.end >= table.row_count() {
            return Err(Error::InvalidRowRange {
                start: self.start,
                end: self.end,
                row_count: table.row_count(),
            });
        }
        Ok(())
    }
}

/// One failed comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MismatchRecord {
    /// Data row index
    pub row: usize,
    /// Left column name
    pub left_column: String,
    /// Right column name
    pub right_column: String,
    /// Left value as it appears in the source
    #[serde(serialize_with = "serialize_display")]
    pub left_value: CellValue,
    /// Right value as it appears in the source
    #[serde(serialize_with = "serialize_display")]
    pub right_value: CellValue,
    /// Why the values disagree
    pub reason: ReasonCode,
}

fn serialize_display<S>(value: &CellValue, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Headline numbers of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Rows in range times number of pairs
    pub total_checks: usize,
    /// Number of mismatch records
    pub mismatches: usize,
}

/// Output of one validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Mismatches in row order, then pair order
    pub mismatches: Vec<MismatchRecord>,
    /// Rows in range times number of pairs, however many mismatched
    pub total_checks: usize,
}

impl ValidationReport {
    /// Number of mismatches found
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    /// True when every checked pair matched
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Summary counts
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            total_checks: self.total_checks,
            mismatches: self.mismatch_count(),
        }
    }
}

/// Compare every row in `range` across every pair in `pairs`.
///
/// Rows are visited in ascending order and pairs in the order given, which is
/// also the order of the returned mismatches. The table is never modified.
pub fn validate(
    table: &Table,
    range: RowRange,
    pairs: &[ColumnPair],
    tolerance: &Tolerance,
) -> Result<ValidationReport> {
    tolerance.validate()?;
    range.check(table)?;

    let resolved = pairs
        .iter()
        .map(|pair| -> Result<_> {
            Ok((resolve(table, &pair.left)?, resolve(table, &pair.right)?, pair))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        start = range.start,
        end = range.end,
        pairs = pairs.len(),
        numeric_tolerance = tolerance.numeric,
        fuzzy_threshold = tolerance.fuzzy_threshold,
        "starting validation"
    );

    let mut mismatches = Vec::new();
    for (row_idx, row) in table.rows[range.start..=range.end].iter().enumerate() {
        let row_idx = range.start + row_idx;

        for (left_idx, right_idx, pair) in &resolved {
            let left = row.get(*left_idx).unwrap_or(&EMPTY_CELL);
            let right = row.get(*right_idx).unwrap_or(&EMPTY_CELL);

            let verdict =
                compare_classified(left, classify(left), right, classify(right), tolerance);
            if !verdict.is_match {
                mismatches.push(MismatchRecord {
                    row: row_idx,
                    left_column: pair.left.clone(),
                    right_column: pair.right.clone(),
                    left_value: left.clone(),
                    right_value: right.clone(),
                    reason: verdict.reason,
                });
            }
        }
    }

    let report = ValidationReport {
        mismatches,
        total_checks: range.row_count() * pairs.len(),
    };

    info!(
        total_checks = report.total_checks,
        mismatches = report.mismatch_count(),
        "validation complete"
    );

    Ok(report)
}

/// Validate a table as described by a run config.
///
/// Missing start/end rows default to the first and last data rows.
pub fn run(table: &Table, config: &RunConfig) -> Result<ValidationReport> {
    let start = config.start_row.unwrap_or(0);
    let end = match config.end_row {
        Some(end) => end,
        None => table.last_row_index().ok_or(Error::InvalidRowRange {
            start,
            end: 0,
            row_count: 0,
        })?,
    };

    let range = RowRange::new(start, end, table)?;
    validate(table, range, &config.pairs, &config.tolerance)
}

fn resolve(table: &Table, name: &str) -> Result<usize> {
    table
        .find_column(name)
        .map(|c| c.index)
        .ok_or_else(|| Error::UnknownColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::from_rows(
            &["left", "right"],
            vec![
                vec![CellValue::Integer(10), CellValue::Float(10.005)],
                vec!["2024-01-05".into(), "01/05/2024".into()],
                vec!["Bob".into(), "Bobby".into()],
            ],
        )
    }

    fn pairs(names: &[(&str, &str)]) -> Vec<ColumnPair> {
        names.iter().map(|(l, r)| ColumnPair::new(*l, *r)).collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let table = sample_table();
        let range = RowRange::full(&table).unwrap();
        let report = validate(&table, range, &pairs(&[("left", "right")]), &Tolerance::default()).unwrap();

        assert_eq!(report.total_checks, 3);
        assert_eq!(report.mismatch_count(), 1);

        let m = &report.mismatches[0];
        assert_eq!(m.row, 2);
        assert_eq!(m.left_column, "left");
        assert_eq!(m.right_column, "right");
        assert_eq!(m.left_value, CellValue::Text("Bob".to_string()));
        assert_eq!(m.right_value, CellValue::Text("Bobby".to_string()));
        assert_eq!(m.reason.tag(), "string-mismatch");
        assert!(m.reason.ratio().unwrap() < 0.85);
    }

    #[test]
    fn test_total_checks_independent_of_mismatches() {
        let table = sample_table();
        let t = Tolerance::default();

        // single row, single pair
        let range = RowRange::new(1, 1, &table).unwrap();
        let report = validate(&table, range, &pairs(&[("left", "right")]), &t).unwrap();
        assert_eq!(report.total_checks, 1);
        assert!(report.is_clean());

        // everything matches itself
        let range = RowRange::full(&table).unwrap();
        let report = validate(&table, range, &pairs(&[("left", "left"), ("right", "right")]), &t).unwrap();
        assert_eq!(report.total_checks, 6);
        assert!(report.is_clean());

        // no pairs at all
        let report = validate(&table, range, &[], &t).unwrap();
        assert_eq!(report.total_checks, 0);
    }

    #[test]
    fn test_duplicate_pairs_are_checked_independently() {
        let table = sample_table();
        let range = RowRange::new(2, 2, &table).unwrap();
        let report = validate(
            &table,
            range,
            &pairs(&[("left", "right"), ("left", "right")]),
            &Tolerance::default(),
        )
        .unwrap();

        assert_eq!(report.total_checks, 2);
        assert_eq!(report.mismatch_count(), 2);
    }

    #[test]
    fn test_output_order_follows_rows_then_pairs() {
        let table = Table::from_rows(
            &["a", "b", "c"],
            vec![
                vec!["x".into(), "1".into(), CellValue::Empty],
                vec!["y".into(), "2".into(), "q".into()],
            ],
        );
        let range = RowRange::full(&table).unwrap();
        let report = validate(
            &table,
            range,
            &pairs(&[("c", "a"), ("a", "b")]),
            &Tolerance::default(),
        )
        .unwrap();

        let order: Vec<(usize, &str)> = report
            .mismatches
            .iter()
            .map(|m| (m.row, m.left_column.as_str()))
            .collect();
        assert_eq!(order, vec![(0, "c"), (0, "a"), (1, "c"), (1, "a")]);
        assert_eq!(report.mismatches[0].reason, ReasonCode::LeftEmpty);
        assert_eq!(report.mismatches[1].reason, ReasonCode::NumParseFail);
    }

    #[test]
    fn test_unknown_column_fails_whole_run() {
        let table = sample_table();
        let range = RowRange::full(&table).unwrap();
        let err = validate(
            &table,
            range,
            &pairs(&[("left", "right"), ("left", "missing")]),
            &Tolerance::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnknownColumn(ref name) if name == "missing"));
    }

    #[test]
    fn test_invalid_row_ranges() {
        let table = sample_table();
        assert!(RowRange::new(2, 1, &table).is_err());
        assert!(RowRange::new(0, 3, &table).is_err());
        assert!(RowRange::new(0, 2, &table).is_ok());

        let empty = Table::from_rows(&["a"], Vec::new());
        assert!(matches!(
            RowRange::full(&empty),
            Err(Error::InvalidRowRange { row_count: 0, .. })
        ));
    }

    #[test]
    fn test_range_checked_against_the_table_it_runs_on() {
        let big = sample_table();
        let small = Table::from_rows(&["left", "right"], vec![vec!["a".into(), "a".into()]]);
        let range = RowRange::full(&big).unwrap();

        let err = validate(&small, range, &pairs(&[("left", "right")]), &Tolerance::default());
        assert!(matches!(err, Err(Error::InvalidRowRange { .. })));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let table = sample_table();
        let range = RowRange::full(&table).unwrap();
        let bad = Tolerance {
            numeric: -1.0,
            fuzzy_threshold: 0.85,
        };
        let err = validate(&table, range, &pairs(&[("left", "right")]), &bad);
        assert!(matches!(err, Err(Error::InvalidTolerance(_))));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let table = sample_table();
        let range = RowRange::full(&table).unwrap();
        let p = pairs(&[("left", "right"), ("right", "left")]);
        let t = Tolerance::default();

        let first = validate(&table, range, &p, &t).unwrap();
        let second = validate(&table, range, &p, &t).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_runs_share_the_table() {
        let table = sample_table();
        let range = RowRange::full(&table).unwrap();
        let p = pairs(&[("left", "right")]);

        let reports: Vec<ValidationReport> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| validate(&table, range, &p, &Tolerance::default()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(reports.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_run_from_config_defaults() {
        let table = sample_table();
        let mut config = RunConfig::new("sample.csv");
        config.add_pair(ColumnPair::new("left", "right"));

        let report = run(&table, &config).unwrap();
        assert_eq!(report.summary(), ValidationSummary { total_checks: 3, mismatches: 1 });

        config.start_row = Some(0);
        config.end_row = Some(1);
        let report = run(&table, &config).unwrap();
        assert_eq!(report.total_checks, 2);
        assert!(report.is_clean());
    }
}
