//! Per-cell type inference
//!
//! Classification only advises which equivalence rule to prefer; it never
//! rejects a value. Every parse attempt here is a pure function returning an
//! `Option`, so each step of the rule chain can be tested on its own.

use crate::table::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Semantic type inferred for a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Missing/null data
    Absent,
    /// Anything convertible to a real number
    Number,
    /// A calendar date (time of day ignored)
    Date,
    /// Everything else
    Text,
}

/// Infer the semantic type of a cell.
///
/// Attempts run in a fixed order: absent, number, date, text. A purely
/// numeric token is therefore never classified as a date.
pub fn classify(value: &CellValue) -> ValueKind {
    if is_absent(value) {
        ValueKind::Absent
    } else if parse_number(value).is_some() {
        ValueKind::Number
    } else if parse_date(value).is_some() {
        ValueKind::Date
    } else {
        ValueKind::Text
    }
}

/// Whether the cell represents missing data.
///
/// A NaN float counts as missing, matching how spreadsheet-derived data marks
/// blank numeric cells.
pub fn is_absent(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => true,
        CellValue::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Try to read the cell as a real number.
///
/// Text spelling "NaN" is not a number here, so every numeric value compares
/// equal to itself.
pub fn parse_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(f) => Some(*f),
        CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
        CellValue::Date(_) | CellValue::Empty => None,
    }
}

/// Try to read the cell as a calendar date
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_str(s),
        CellValue::Integer(_) | CellValue::Float(_) | CellValue::Empty => None,
    }
}

/// Full date-time layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

/// Date layouts that spell out the month. Chrono's `%B` accepts both full and
/// abbreviated month names, case-insensitively.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%B-%Y",
    "%d/%B/%Y",
    "%Y-%B-%d",
    "%Y %B %d",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon",
    "tue", "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

/// Best-effort, permissive date parsing of free text
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    let s = strip_weekday(s);
    if let Some(date) = parse_date_only(s) {
        return Some(date);
    }

    // "<date> <time>" with a free-form date part
    parse_date_only(strip_trailing_time(s)?)
}

fn parse_date_only(s: &str) -> Option<NaiveDate> {
    if let Some(date) = parse_numeric_date(s) {
        return Some(date);
    }

    let s = normalize_sept(s);
    NAMED_MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
        .or_else(|| parse_month_year(&s))
}

/// `"Jan 2024"` or `"January, 2024"`, read as the first of the month
fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let first = format!("1 {}", s.replacen(',', "", 1));
    NaiveDate::parse_from_str(&first, "%d %B %Y").ok()
}

/// Chrono knows `Sep` and `September` but not `Sept`
fn normalize_sept(s: &str) -> Cow<'_, str> {
    let lower = s.to_ascii_lowercase();
    match lower.find("sept") {
        Some(idx) if !lower[idx + 4..].starts_with('e') => {
            Cow::Owned(format!("{}{}", &s[..idx + 3], &s[idx + 4..]))
        }
        _ => Cow::Borrowed(s),
    }
}

/// Three digit groups joined by one of `-`, `/` or `.`.
///
/// A four-digit first group is read year-first. Otherwise the year comes last
/// and the first group is the month, unless it cannot be one, in which case
/// the date is read day-first.
fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let sep = s.chars().find(|c| !c.is_ascii_digit())?;
    if !matches!(sep, '-' | '/' | '.') {
        return None;
    }

    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if parts[0].len() == 4 {
        if parts[1].len() > 2 || parts[2].len() > 2 {
            return None;
        }
        let year: i32 = parts[0].parse().ok()?;
        let a: u32 = parts[1].parse().ok()?;
        let b: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a));
    }

    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let year = match parts[2].len() {
        4 => parts[2].parse::<i32>().ok()?,
        2 => pivot_two_digit_year(parts[2].parse().ok()?),
        _ => return None,
    };
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;

    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

/// Two-digit years land in 1970..=2069
fn pivot_two_digit_year(yy: i32) -> i32 {
    if yy < 70 {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn strip_weekday(s: &str) -> &str {
    let end = s
        .find(|c: char| c == ',' || c.is_whitespace())
        .unwrap_or(s.len());
    let word = s[..end].trim_end_matches('.');

    if end < s.len() && WEEKDAYS.contains(&word.to_ascii_lowercase().as_str()) {
        s[end..].trim_start_matches(',').trim_start()
    } else {
        s
    }
}

/// Date part of `"<date> <time>"`. The time may carry an AM/PM marker or a
/// `Z` suffix.
fn strip_trailing_time(s: &str) -> Option<&str> {
    let lower = s.to_ascii_lowercase();
    let body = if lower.ends_with(" am") || lower.ends_with(" pm") {
        s[..s.len() - 3].trim_end()
    } else {
        s
    };

    let (idx, sep) = body
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || *c == 'T')?;
    let (head, tail) = (body[..idx].trim_end(), &body[idx + sep.len_utf8()..]);
    let time = tail.trim_end_matches('Z');

    TIME_FORMATS
        .iter()
        .any(|fmt| NaiveTime::parse_from_str(time, fmt).is_ok())
        .then_some(head)
}
