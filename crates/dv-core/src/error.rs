//! Error types for dv-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dv-core
///
/// Only run-level failures live here. A cell that fails to parse is never an
/// error; it becomes a reason code on the comparison instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Requested header row does not exist in the source
    #[error("header row {header_row} is out of range ({record_count} records in '{path}')")]
    HeaderRowOutOfRange {
        header_row: usize,
        record_count: usize,
        path: PathBuf,
    },

    /// Row range does not fit the table
    #[error("invalid row range {start}..={end} for a table with {row_count} data rows")]
    InvalidRowRange {
        start: usize,
        end: usize,
        row_count: usize,
    },

    /// A column pair references a column the table does not have
    #[error("column '{0}' not found")]
    UnknownColumn(String),

    /// Tolerance values outside their valid domain
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),

    /// Malformed column pair specification
    #[error("invalid column pair '{0}', expected LEFT=RIGHT")]
    InvalidPair(String),

    /// A required run input was not supplied
    #[error("missing required input: {0}")]
    MissingInput(String),

    /// CSV export error
    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
