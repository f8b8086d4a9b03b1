//! CSV parser with header-row selection

use crate::error::{Error, Result};
use crate::table::{make_unique, CellValue, Column, Row, Table};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Parse a CSV file into a Table.
///
/// Record `header_row` (0-based) supplies the column names; records before it
/// are skipped and records after it become data rows 0, 1, 2, ...
pub fn parse_csv<P: AsRef<Path>>(path: P, header_row: usize) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_table(BufReader::new(file), path.to_path_buf(), header_row)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str, header_row: usize) -> Result<Table> {
    read_table(content.as_bytes(), PathBuf::from(source_name), header_row)
}

fn read_table<R: Read>(reader: R, path: PathBuf, header_row: usize) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;
        records.push(record);
    }

    let header = records
        .get(header_row)
        .ok_or_else(|| Error::HeaderRowOutOfRange {
            header_row,
            record_count: records.len(),
            path: path.clone(),
        })?;

    let columns: Vec<Column> = make_unique(header.iter().map(|name| name.to_string()))
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    if columns.is_empty() {
        return Err(Error::CsvParse {
            path,
            message: "no columns found in header row".to_string(),
        });
    }

    let mut rows = Vec::with_capacity(records.len().saturating_sub(header_row + 1));
    for (row_idx, record) in records.iter().skip(header_row + 1).enumerate() {
        let mut cells: Vec<CellValue> = record.iter().map(CellValue::from_raw).collect();

        if cells.len() > columns.len() {
            warn!(
                row = row_idx,
                path = %path.display(),
                "row has more cells than columns, truncating"
            );
            cells.truncate(columns.len());
        }
        cells.resize(columns.len(), CellValue::Empty);

        rows.push(Row::new(cells));
    }

    Ok(Table {
        columns,
        rows,
        source_path: path,
    })
}
