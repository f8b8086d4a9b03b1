use std::fs;

use dv_core::{
    parse_csv, run, write_csv_file, CellValue, ColumnPair, ReasonCode, RunConfig, Tolerance,
};

const LEDGER: &str = "\
Ledger export,,,,
id,amount,booked,name,amount
1,10,2024-01-05,Bob,10.005
2,7.5,2024-02-01,Jonathan,7.49
3,,03/15/2024,Alice,
4,abc,2024-04-01,Carol,4
";

fn write_ledger(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("ledger.csv");
    fs::write(&path, LEDGER).unwrap();
    path
}

#[test]
fn validate_csv_with_offset_header_and_duplicate_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ledger(&dir);

    let table = parse_csv(&path, 1).unwrap();
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "amount", "booked", "name", "amount__1"]);
    assert_eq!(table.row_count(), 4);

    let mut config = RunConfig::new(&path);
    config.header_row = 1;
    config.add_pair(ColumnPair::new("amount", "amount__1"));

    let report = run(&table, &config).unwrap();
    assert_eq!(report.total_checks, 4);

    let reasons: Vec<(usize, ReasonCode)> =
        report.mismatches.iter().map(|m| (m.row, m.reason)).collect();
    // row 2: both blank -> "empty" match; row 1 off by 0.01 -> inclusive match
    assert_eq!(reasons, vec![(3, ReasonCode::NumParseFail)]);
    assert_eq!(report.mismatches[0].left_value, CellValue::Text("abc".to_string()));
}

#[test]
fn run_config_round_trips_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.json");

    let mut config = RunConfig::new("ledger.csv");
    config.header_row = 1;
    config.end_row = Some(2);
    config.tolerance = Tolerance::new(0.5, 0.6).unwrap();
    config.add_pair(ColumnPair::new("amount", "amount__1"));
    config.add_pair(ColumnPair::new("amount", "amount__1"));

    config.save(&config_path).unwrap();
    let loaded = RunConfig::load(&config_path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn mismatch_export_writes_one_row_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ledger(&dir);
    let out = dir.path().join("mismatches.csv");

    let table = parse_csv(&path, 1).unwrap();
    let mut config = RunConfig::new(&path);
    config.header_row = 1;
    config.add_pair(ColumnPair::new("name", "booked"));

    let report = run(&table, &config).unwrap();
    write_csv_file(&report.mismatches, &out).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "row,left_column,right_column,left_value,right_value,reason");
    assert_eq!(lines.len(), report.mismatch_count() + 1);
    assert_eq!(report.mismatch_count(), 4);
    assert!(lines[1].starts_with("0,name,booked,Bob,2024-01-05,string-mismatch ("));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RunConfig::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, dv_core::Error::FileRead { .. }));
}
