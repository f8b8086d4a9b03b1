//! dv-core: Core library for reconciling paired columns of a table
//!
//! This library provides functionality to:
//! - Parse CSV files into tables, with a selectable header row
//! - Infer a semantic type (absent, number, date, text) for each cell
//! - Decide whether two cells are equivalent using numeric tolerance,
//!   calendar-date equality or fuzzy text similarity
//! - Validate a range of rows across a list of column pairs and collect
//!   the mismatches
//! - Export mismatch reports as CSV or JSON

pub mod classify;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod parser;
pub mod report;
pub mod similarity;
pub mod table;
pub mod validator;

pub use classify::{classify, ValueKind};
pub use config::{ColumnPair, RunConfig, Tolerance};
pub use equivalence::{compare_classified, equivalent, ReasonCode, Verdict};
pub use error::{Error, Result};
pub use parser::{parse_csv, parse_csv_str};
pub use report::{to_json, write_csv, write_csv_file};
pub use table::{CellValue, Column, Row, Table};
pub use validator::{run, validate, MismatchRecord, RowRange, ValidationReport, ValidationSummary};
