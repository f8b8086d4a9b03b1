//! Mismatch report export

use crate::error::Result;
use crate::validator::{MismatchRecord, ValidationReport};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column headers of the CSV export, in order
pub const CSV_HEADER: [&str; 6] = [
    "row",
    "left_column",
    "right_column",
    "left_value",
    "right_value",
    "reason",
];

/// Write mismatches as CSV, one row per mismatch under a header row
pub fn write_csv<W: Write>(records: &[MismatchRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for record in records {
        csv_writer.write_record([
            record.row.to_string(),
            record.left_column.clone(),
            record.right_column.clone(),
            record.left_value.to_string_value(),
            record.right_value.to_string_value(),
            record.reason.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write mismatches as CSV to a file
pub fn write_csv_file<P: AsRef<Path>>(records: &[MismatchRecord], path: P) -> Result<()> {
    let file = File::create(path)?;
    write_csv(records, BufWriter::new(file))
}

/// Render the full report, summary included, as pretty JSON
pub fn to_json(report: &ValidationReport) -> Result<String> {
    let value = serde_json::json!({
        "summary": report.summary(),
        "mismatches": report.mismatches,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::ReasonCode;
    use crate::table::CellValue;

    fn sample_records() -> Vec<MismatchRecord> {
        vec![
            MismatchRecord {
                row: 2,
                left_column: "name".to_string(),
                right_column: "name__1".to_string(),
                left_value: CellValue::Text("Bob".to_string()),
                right_value: CellValue::Text("Bobby".to_string()),
                reason: ReasonCode::StringMismatch(0.75),
            },
            MismatchRecord {
                row: 4,
                left_column: "amount".to_string(),
                right_column: "total, net".to_string(),
                left_value: CellValue::Empty,
                right_value: CellValue::Float(3.5),
                reason: ReasonCode::LeftEmpty,
            },
        ]
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&sample_records(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "row,left_column,right_column,left_value,right_value,reason");
        assert_eq!(lines[1], "2,name,name__1,Bob,Bobby,string-mismatch (0.75)");
        assert_eq!(lines[2], "4,amount,\"total, net\",,3.5,left-empty");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_csv_empty_has_header() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "row,left_column,right_column,left_value,right_value,reason\n"
        );
    }

    #[test]
    fn test_to_json() {
        let report = ValidationReport {
            mismatches: sample_records(),
            total_checks: 10,
        };
        let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();

        assert_eq!(json["summary"]["total_checks"], 10);
        assert_eq!(json["summary"]["mismatches"], 2);
        assert_eq!(json["mismatches"][0]["right_value"], "Bobby");
        assert_eq!(json["mismatches"][0]["reason"], "string-mismatch (0.75)");
        assert_eq!(json["mismatches"][1]["left_value"], "");
    }
}
