//! Export run results to CSV/text files.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts:
//!
//! - `fold_metrics.csv`       `Fold,RMSE,MAE,R2`
//! - `predictions.csv`        `Fold,Actual,Predicted,<sample label>`
//! - `equation.txt`           the model equation
//! - `coefficients.csv`       `Variable,Coefficient`
//! - `coefficient_ranking.csv` `Variable,AbsCoefficient,Rank`

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::domain::RawTable;
use crate::error::AppError;
use crate::report::Report;

pub const FOLD_METRICS_FILE: &str = "fold_metrics.csv";
pub const PREDICTIONS_FILE: &str = "predictions.csv";
pub const EQUATION_FILE: &str = "equation.txt";
pub const COEFFICIENTS_FILE: &str = "coefficients.csv";
pub const RANKING_FILE: &str = "coefficient_ranking.csv";

/// Write every report artifact into `dir` (created if needed).
///
/// Returns the paths written, in the order listed in the module docs.
pub fn write_report(dir: &Path, report: &Report) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let fold_metrics = dir.join(FOLD_METRICS_FILE);
    write_rows_csv(&fold_metrics, &report.fold_metrics)?;

    let predictions = dir.join(PREDICTIONS_FILE);
    write_predictions_csv(&predictions, report)?;

    let equation = dir.join(EQUATION_FILE);
    let mut file = File::create(&equation)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", equation.display())))?;
    writeln!(file, "{}", report.equation)
        .map_err(|e| AppError::io(format!("Failed to write equation: {e}")))?;

    let coefficients = dir.join(COEFFICIENTS_FILE);
    write_rows_csv(&coefficients, &report.coefficients)?;

    let ranking = dir.join(RANKING_FILE);
    write_rows_csv(&ranking, &report.ranking)?;

    let written = vec![fold_metrics, predictions, equation, coefficients, ranking];
    info!("Wrote {} report files to '{}'.", written.len(), dir.display());
    Ok(written)
}

/// Serialize typed rows with their serde field names as the header.
pub fn write_rows_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))
}

fn write_predictions_csv(path: &Path, report: &Report) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    writer
        .write_record(["Fold", "Actual", "Predicted", report.id_label.as_str()])
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;
    for p in &report.predictions {
        writer
            .write_record([
                p.fold.to_string(),
                p.actual.to_string(),
                p.predicted.to_string(),
                p.sample_id.clone(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV '{}': {e}", path.display())))
}

/// Write a raw table (header + string cells) to CSV.
pub fn write_table_csv(path: &Path, table: &RawTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV '{}': {e}", path.display())))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::io(format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CoefficientRow, FoldMetricRow, OofPrediction};
    use crate::io::ingest::load_table;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("soil-bd-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn report() -> Report {
        Report {
            target: "BD".to_string(),
            equation: "BD = 1.0000 + (2.0000 * OC)".to_string(),
            coefficients: vec![
                CoefficientRow {
                    variable: "const".to_string(),
                    coefficient: 1.0,
                },
                CoefficientRow {
                    variable: "OC".to_string(),
                    coefficient: 2.0,
                },
            ],
            ranking: Vec::new(),
            fold_metrics: vec![FoldMetricRow {
                fold: 1,
                rmse: 0.1,
                mae: 0.05,
                r2: 0.9,
            }],
            predictions: vec![OofPrediction {
                fold: 1,
                source_row: 0,
                sample_id: "S0001".to_string(),
                actual: 1.5,
                predicted: 1.4,
            }],
            id_label: "Sample_ID".to_string(),
        }
    }

    #[test]
    fn report_files_have_expected_headers() {
        let dir = scratch_dir("report");
        let written = write_report(&dir, &report()).unwrap();
        assert_eq!(written.len(), 5);

        let metrics = std::fs::read_to_string(dir.join(FOLD_METRICS_FILE)).unwrap();
        assert!(metrics.starts_with("Fold,RMSE,MAE,R2\n1,0.1,0.05,0.9"));

        let preds = load_table(&dir.join(PREDICTIONS_FILE), b',').unwrap();
        assert_eq!(preds.table.headers, vec!["Fold", "Actual", "Predicted", "Sample_ID"]);
        assert_eq!(preds.table.cell(0, 3), "S0001");

        let coefs = std::fs::read_to_string(dir.join(COEFFICIENTS_FILE)).unwrap();
        assert!(coefs.starts_with("Variable,Coefficient\nconst,1.0\nOC,2.0"));

        let equation = std::fs::read_to_string(dir.join(EQUATION_FILE)).unwrap();
        assert_eq!(equation.trim_end(), "BD = 1.0000 + (2.0000 * OC)");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn table_round_trips_through_ingest() {
        let dir = scratch_dir("table");
        create_dir_all(&dir).unwrap();
        let path = dir.join("t.csv");
        let table = RawTable::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string(), "x, y".to_string()]],
        );
        write_table_csv(&path, &table).unwrap();
        let back = load_table(&path, b',').unwrap();
        assert_eq!(back.table.rows, table.rows);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
