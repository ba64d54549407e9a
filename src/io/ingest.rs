//! CSV ingest.
//!
//! This module is responsible for turning a survey CSV into a `RawTable` of
//! string cells. All typing decisions (numeric casts, sentinels, categorical
//! columns) belong to `data::preprocess`.
//!
//! Design goals:
//! - **Lenient rows**: short or long rows are accepted; short rows read as
//!   missing trailing cells
//! - **Row-level reporting**: unparseable records are skipped and reported
//! - **Separation of concerns**: no cleaning or fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};

use crate::domain::RawTable;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the table plus row-level errors.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: RawTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a delimited text file into a `RawTable`.
pub fn load_table(path: &Path, delimiter: u8) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_table(file, delimiter)?;
    info!(
        "Loaded {} rows x {} columns from '{}'.",
        ingested.table.n_rows(),
        ingested.table.headers.len(),
        path.display()
    );
    Ok(ingested)
}

/// Read a delimited table from any reader.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::io("CSV has no header row."));
    }

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        match result {
            Ok(record) => {
                if record.len() > headers.len() {
                    row_errors.push(RowError {
                        line,
                        message: format!(
                            "{} fields for {} columns; extra fields ignored.",
                            record.len(),
                            headers.len()
                        ),
                    });
                }
                rows.push(record.iter().take(headers.len()).map(str::to_string).collect());
            }
            Err(e) => row_errors.push(RowError {
                line,
                message: format!("CSV parse error: {e}"),
            }),
        }
    }

    for err in &row_errors {
        warn!("line {}: {}", err.line, err.message);
    }

    Ok(IngestedTable {
        table: RawTable::new(headers, rows),
        row_errors,
        rows_read,
    })
}

/// Parse a delimiter flag value (`,`, `;`, `tab`, `\t`).
pub fn parse_delimiter(s: &str) -> Result<u8, AppError> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(AppError::config(format!(
            "Invalid delimiter '{s}' (expected a single ASCII character or `tab`)."
        ))),
    }
}
