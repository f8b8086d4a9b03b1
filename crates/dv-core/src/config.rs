//! Run configuration
//!
//! Everything a validation run needs is gathered into one immutable value
//! that is passed into the engine. Run configs are stored as JSON.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default absolute tolerance for numeric comparisons
pub const DEFAULT_NUMERIC_TOLERANCE: f64 = 0.01;

/// Default minimum similarity ratio for a fuzzy text match
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Tolerance settings applied uniformly to every comparison in a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Maximum absolute difference for two numbers to match (inclusive)
    pub numeric: f64,
    /// Minimum similarity ratio in `[0, 1]` for two strings to match
    pub fuzzy_threshold: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            numeric: DEFAULT_NUMERIC_TOLERANCE,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl Tolerance {
    /// Create a tolerance, checking both values
    pub fn new(numeric: f64, fuzzy_threshold: f64) -> Result<Self> {
        let tolerance = Self {
            numeric,
            fuzzy_threshold,
        };
        tolerance.validate()?;
        Ok(tolerance)
    }

    /// Check that both values are inside their valid domain
    pub fn validate(&self) -> Result<()> {
        if !self.numeric.is_finite() || self.numeric < 0.0 {
            return Err(Error::InvalidTolerance(format!(
                "numeric tolerance must be a finite value >= 0, got {}",
                self.numeric
            )));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(Error::InvalidTolerance(format!(
                "fuzzy threshold must be within [0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        Ok(())
    }
}

/// A left/right column correspondence to reconcile cell by cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    /// Left column name
    pub left: String,
    /// Right column name
    pub right: String,
}

impl ColumnPair {
    /// Create a new column pair
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl FromStr for ColumnPair {
    type Err = Error;

    /// Parse `LEFT=RIGHT`. Column names may themselves contain `=`; the
    /// split happens at the first one.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((left, right)) if !left.is_empty() && !right.is_empty() => {
                Ok(Self::new(left, right))
            }
            _ => Err(Error::InvalidPair(s.to_string())),
        }
    }
}

/// A complete validation run description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source CSV file
    pub file: PathBuf,
    /// 0-based record index holding the column names
    #[serde(default)]
    pub header_row: usize,
    /// First data row to check (defaults to 0)
    #[serde(default)]
    pub start_row: Option<usize>,
    /// Last data row to check, inclusive (defaults to the last row)
    #[serde(default)]
    pub end_row: Option<usize>,
    /// Column pairs, checked in this order
    pub pairs: Vec<ColumnPair>,
    /// Tolerance settings
    #[serde(default)]
    pub tolerance: Tolerance,
}

impl RunConfig {
    /// Create a config covering the whole table with default tolerances
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            header_row: 0,
            start_row: None,
            end_row: None,
            pairs: Vec::new(),
            tolerance: Tolerance::default(),
        }
    }

    /// Add a column pair
    pub fn add_pair(&mut self, pair: ColumnPair) {
        self.pairs.push(pair);
    }

    /// Load a run config from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the run config to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
