//! Core table types for representing the source data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A materialized table: data rows addressed by index, columns by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Data rows (everything after the header row)
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
        }
    }

    /// Build a table from column names and rows of cells.
    ///
    /// Names go through [`make_unique`]; rows are padded or truncated to the
    /// column count.
    pub fn from_rows(names: &[&str], rows: Vec<Vec<CellValue>>) -> Self {
        let columns = make_unique(names.iter().map(|s| s.to_string()))
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column::new(name, i))
            .collect::<Vec<_>>();

        let rows = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(columns.len(), CellValue::Empty);
                Row::new(cells)
            })
            .collect();

        Self {
            columns,
            rows,
            source_path: PathBuf::from("<memory>"),
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the last data row, if there is one
    pub fn last_row_index(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a cell by row and column index
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

/// A column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within the table
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A raw cell value.
///
/// Cells read from CSV are always `Text` (or `Empty`); the typed variants are
/// for callers that already hold typed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Raw text, kept exactly as it appeared in the source
    Text(String),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Wrap a raw source field. Blank and whitespace-only fields are `Empty`.
    pub fn from_raw(s: &str) -> Self {
        if s.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from_raw(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Empty, Into::into)
    }
}

/// Disambiguate duplicate column names.
///
/// The first occurrence keeps its name; later ones get `__1`, `__2`, ...
/// appended in order of appearance. A suffix already taken by another column
/// is skipped, so every returned name is distinct.
pub fn make_unique<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for name in names {
        if taken.insert(name.clone()) {
            out.push(name);
            continue;
        }

        let count = counts.entry(name.clone()).or_insert(0);
        let unique = loop {
            *count += 1;
            let candidate = format!("{}__{}", name, count);
            if taken.insert(candidate.clone()) {
                break candidate;
            }
        };
        out.push(unique);
    }

    out
}
