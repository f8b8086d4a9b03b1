//! Type-aware equivalence of two cell values
//!
//! Rules are tried in a fixed priority order and the first one that applies
//! decides:
//!
//! 1. both absent: match
//! 2. one absent: no match
//! 3. either side numeric: both must parse as numbers and lie within the
//!    numeric tolerance; a side that does not parse is reported, never
//!    reinterpreted
//! 4. either side a date: same calendar day; if a side does not parse as a
//!    date the pair is compared as text instead
//! 5. text: case-insensitive exact match, otherwise a fuzzy similarity ratio
//!    against the threshold

use crate::classify::{classify, parse_date, parse_number, ValueKind};
use crate::config::Tolerance;
use crate::similarity;
use crate::table::CellValue;
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a comparison matched or failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReasonCode {
    /// Both sides absent
    Empty,
    /// Only the left side is absent
    LeftEmpty,
    /// Only the right side is absent
    RightEmpty,
    /// Numbers within tolerance
    NumOk,
    /// Numbers outside tolerance
    NumMismatch,
    /// Numeric comparison required but a side is not a number
    NumParseFail,
    /// Same calendar date
    DateOk,
    /// Different calendar dates
    DateMismatch,
    /// Case-insensitive exact text match
    StringMatch,
    /// Inexact text, carrying the similarity ratio. Used whether or not the
    /// ratio clears the threshold.
    StringMismatch(f64),
}

impl ReasonCode {
    /// The reason tag without the ratio annotation
    pub fn tag(&self) -> &'static str {
        match self {
            ReasonCode::Empty => "empty",
            ReasonCode::LeftEmpty => "left-empty",
            ReasonCode::RightEmpty => "right-empty",
            ReasonCode::NumOk => "num-ok",
            ReasonCode::NumMismatch => "num-mismatch",
            ReasonCode::NumParseFail => "num-parse-fail",
            ReasonCode::DateOk => "date-ok",
            ReasonCode::DateMismatch => "date-mismatch",
            ReasonCode::StringMatch => "string-match",
            ReasonCode::StringMismatch(_) => "string-mismatch",
        }
    }

    /// Similarity ratio, for fuzzy text comparisons only
    pub fn ratio(&self) -> Option<f64> {
        match self {
            ReasonCode::StringMismatch(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonCode::StringMismatch(r) => write!(f, "{} ({:.2})", self.tag(), r),
            _ => f.write_str(self.tag()),
        }
    }
}

impl Serialize for ReasonCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of comparing one cell pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub is_match: bool,
    pub reason: ReasonCode,
}

impl Verdict {
    fn matched(reason: ReasonCode) -> Self {
        Self {
            is_match: true,
            reason,
        }
    }

    fn mismatched(reason: ReasonCode) -> Self {
        Self {
            is_match: false,
            reason,
        }
    }
}

/// Classify both values and compare them
pub fn equivalent(left: &CellValue, right: &CellValue, tolerance: &Tolerance) -> Verdict {
    compare_classified(left, classify(left), right, classify(right), tolerance)
}

/// Compare two values whose kinds are already known
pub fn compare_classified(
    left: &CellValue,
    left_kind: ValueKind,
    right: &CellValue,
    right_kind: ValueKind,
    tolerance: &Tolerance,
) -> Verdict {
    match (left_kind, right_kind) {
        (ValueKind::Absent, ValueKind::Absent) => return Verdict::matched(ReasonCode::Empty),
        (ValueKind::Absent, _) => return Verdict::mismatched(ReasonCode::LeftEmpty),
        (_, ValueKind::Absent) => return Verdict::mismatched(ReasonCode::RightEmpty),
        _ => {}
    }

    if left_kind == ValueKind::Number || right_kind == ValueKind::Number {
        return compare_numbers(left, right, tolerance.numeric);
    }

    if left_kind == ValueKind::Date || right_kind == ValueKind::Date {
        if let Some(verdict) = compare_dates(left, right) {
            return verdict;
        }
    }

    compare_text(left, right, tolerance.fuzzy_threshold)
}

/// Largest rounding allowance, as a fraction of the tolerance
const MAX_SLACK: f64 = 1e-6;

/// Absolute-difference check, inclusive at the tolerance.
///
/// Differences within one unit of float resolution above the tolerance still
/// match, so that e.g. `1.00` vs `1.01` sits on the boundary of `0.01`. The
/// allowance never exceeds a millionth of the tolerance. Infinities only
/// match themselves.
fn compare_numbers(left: &CellValue, right: &CellValue, tolerance: f64) -> Verdict {
    let (Some(a), Some(b)) = (parse_number(left), parse_number(right)) else {
        return Verdict::mismatched(ReasonCode::NumParseFail);
    };

    let within = a.is_finite() && b.is_finite() && {
        let slack = (f64::EPSILON * a.abs().max(b.abs())).min(tolerance * MAX_SLACK);
        (a - b).abs() <= tolerance + slack
    };
    if a == b || within {
        Verdict::matched(ReasonCode::NumOk)
    } else {
        Verdict::mismatched(ReasonCode::NumMismatch)
    }
}

/// `None` when either side does not parse as a date
fn compare_dates(left: &CellValue, right: &CellValue) -> Option<Verdict> {
    let a = parse_date(left)?;
    let b = parse_date(right)?;

    Some(if a == b {
        Verdict::matched(ReasonCode::DateOk)
    } else {
        Verdict::mismatched(ReasonCode::DateMismatch)
    })
}

fn compare_text(left: &CellValue, right: &CellValue, threshold: f64) -> Verdict {
    let a = left.to_string_value().trim().to_lowercase();
    let b = right.to_string_value().trim().to_lowercase();

    if a == b {
        return Verdict::matched(ReasonCode::StringMatch);
    }

    let ratio = similarity::ratio(&a, &b);
    Verdict {
        is_match: ratio >= threshold,
        reason: ReasonCode::StringMismatch(ratio),
    }
}
