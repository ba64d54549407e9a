//! Raw table → numeric design matrix.
//!
//! This module turns a loosely typed survey table into a clean `Dataset` that
//! is safe to fit:
//!
//! 1. trim header names
//! 2. mark sentinel/empty cells as missing
//! 3. capture sample labels, then drop configured columns
//! 4. cast non-categorical columns to numbers (unparseable → missing)
//! 5. drop numeric columns whose missing fraction exceeds the threshold
//! 6. drop rows with any remaining missing value (no imputation)
//! 7. one-hot encode categoricals with the first level as reference
//!
//! No fitting logic lives here.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

use crate::domain::{
    Dataset, DropReason, DroppedColumn, EncodedCategory, PreprocessConfig, PreprocessSummary, RawTable,
};
use crate::error::{AppError, ErrorKind};

/// Label header used when no identifier column is configured.
const DEFAULT_ID_LABEL: &str = "Sample";

#[derive(Debug)]
struct NumericColumn {
    name: String,
    values: Vec<Option<f64>>,
}

#[derive(Debug)]
struct CategoricalColumn {
    name: String,
    values: Vec<Option<String>>,
}

/// Clean `table` into modeling data according to `config`.
pub fn preprocess(table: &RawTable, config: &PreprocessConfig) -> Result<Dataset, AppError> {
    validate_config(config)?;

    let headers: Vec<String> = table.headers.iter().map(|h| normalize_header_name(h)).collect();
    ensure_unique(&headers)?;

    let target = config.target.trim();
    let drop: HashSet<&str> = config.drop_columns.iter().map(|s| s.trim()).collect();
    let categorical: HashSet<&str> = config.categorical.iter().map(|s| s.trim()).collect();
    let n = table.n_rows();

    let mut summary = PreprocessSummary {
        rows_in: n,
        ..Default::default()
    };

    // Sample labels are captured before any column is dropped so an identifier
    // can be both excluded from X and used for join-back.
    let id_col = match config.id_column.as_deref().map(str::trim) {
        Some(name) => {
            let idx = headers.iter().position(|h| h == name);
            if idx.is_none() {
                warn!("Identifier column `{name}` not found; labeling samples by row number.");
            }
            idx
        }
        None => None,
    };
    let id_label = id_col
        .map(|c| headers[c].clone())
        .unwrap_or_else(|| DEFAULT_ID_LABEL.to_string());
    let all_ids: Vec<String> = (0..n)
        .map(|r| match id_col {
            Some(c) => table.cell(r, c).trim().to_string(),
            None => (r + 1).to_string(),
        })
        .collect();

    let mut numeric = Vec::new();
    let mut categories = Vec::new();

    for (c, name) in headers.iter().enumerate() {
        if drop.contains(name.as_str()) {
            summary.dropped_columns.push(DroppedColumn {
                name: name.clone(),
                reason: DropReason::Configured,
            });
            continue;
        }
        if Some(c) == id_col {
            continue;
        }

        if categorical.contains(name.as_str()) && name != target {
            let values = (0..n)
                .map(|r| {
                    let cell = table.cell(r, c);
                    (!is_missing(cell, &config.missing_sentinels)).then(|| cell.trim().to_string())
                })
                .collect();
            categories.push(CategoricalColumn {
                name: name.clone(),
                values,
            });
        } else {
            let values = (0..n)
                .map(|r| parse_cell(table.cell(r, c), &config.missing_sentinels))
                .collect();
            numeric.push(NumericColumn {
                name: name.clone(),
                values,
            });
        }
    }

    // Column-level missingness filter, applied before any row is removed.
    numeric.retain(|col| {
        let missing = col.values.iter().filter(|v| v.is_none()).count();
        let fraction = if n == 0 { 0.0 } else { missing as f64 / n as f64 };
        if fraction > config.missing_threshold {
            debug!(
                "Dropping `{}`: {:.1}% missing exceeds {:.1}%.",
                col.name,
                fraction * 100.0,
                config.missing_threshold * 100.0
            );
            summary.dropped_columns.push(DroppedColumn {
                name: col.name.clone(),
                reason: DropReason::TooManyMissing { fraction },
            });
            false
        } else {
            true
        }
    });

    let Some(target_pos) = numeric.iter().position(|col| col.name == target) else {
        return Err(AppError::new(
            ErrorKind::MissingTargetColumn,
            format!("Target column `{target}` is missing after preprocessing."),
        ));
    };

    let keep_rows: Vec<usize> = (0..n)
        .filter(|&r| {
            numeric.iter().all(|col| col.values[r].is_some())
                && categories.iter().all(|col| col.values[r].is_some())
        })
        .collect();

    if keep_rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyDataset,
            "No complete rows remain after preprocessing.",
        ));
    }

    let target_col = numeric.remove(target_pos);
    let y = DVector::from_iterator(
        keep_rows.len(),
        keep_rows.iter().map(|&r| target_col.values[r].unwrap_or(f64::NAN)),
    );

    let mut feature_names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for col in &numeric {
        feature_names.push(col.name.clone());
        columns.push(keep_rows.iter().map(|&r| col.values[r].unwrap_or(f64::NAN)).collect());
    }

    for col in &categories {
        let (encoded, indicators) = one_hot(col, &keep_rows);
        for (level, values) in indicators {
            feature_names.push(format!("{}_{level}", col.name));
            columns.push(values);
        }
        summary.encoded.push(encoded);
    }
    ensure_unique(&feature_names)?;

    let x = DMatrix::from_fn(keep_rows.len(), feature_names.len(), |i, j| columns[j][i]);

    summary.rows_out = keep_rows.len();
    info!(
        "Preprocessed {} rows -> {} complete rows, {} features ({} columns dropped).",
        summary.rows_in,
        summary.rows_out,
        feature_names.len(),
        summary.dropped_columns.len()
    );

    Ok(Dataset {
        target: target.to_string(),
        feature_names,
        x,
        y,
        id_label,
        sample_ids: keep_rows.iter().map(|&r| all_ids[r].clone()).collect(),
        source_rows: keep_rows,
        summary,
    })
}

fn validate_config(config: &PreprocessConfig) -> Result<(), AppError> {
    if config.target.trim().is_empty() {
        return Err(AppError::config("Target column name must not be empty."));
    }
    if !(config.missing_threshold.is_finite() && (0.0..=1.0).contains(&config.missing_threshold)) {
        return Err(AppError::config(format!(
            "Invalid missing threshold {} (must be within [0, 1]).",
            config.missing_threshold
        )));
    }
    Ok(())
}

fn ensure_unique(names: &[String]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(AppError::config(format!("Duplicate column name `{name}`.")));
        }
    }
    Ok(())
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn is_missing(cell: &str, sentinels: &[String]) -> bool {
    let cell = cell.trim();
    cell.is_empty() || sentinels.iter().any(|s| s.trim() == cell)
}

fn parse_cell(cell: &str, sentinels: &[String]) -> Option<f64> {
    if is_missing(cell, sentinels) {
        return None;
    }
    let v = cell.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Indicator columns over `rows`, levels sorted, first level dropped.
fn one_hot(col: &CategoricalColumn, rows: &[usize]) -> (EncodedCategory, Vec<(String, Vec<f64>)>) {
    let levels: BTreeSet<&str> = rows
        .iter()
        .filter_map(|&r| col.values[r].as_deref())
        .collect();
    let mut levels = levels.into_iter();
    let reference = levels.next().unwrap_or_default().to_string();

    let indicators: Vec<(String, Vec<f64>)> = levels
        .map(|level| {
            let values = rows
                .iter()
                .map(|&r| if col.values[r].as_deref() == Some(level) { 1.0 } else { 0.0 })
                .collect();
            (level.to_string(), values)
        })
        .collect();

    let encoded = EncodedCategory {
        column: col.name.clone(),
        reference,
        indicators: indicators.iter().map(|(level, _)| level.clone()).collect(),
    };
    (encoded, indicators)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn soil_config() -> PreprocessConfig {
        let mut config = PreprocessConfig::new("BD");
        config.categorical = vec!["Soil_Order".to_string()];
        config.drop_columns = vec!["ID".to_string(), "Lat".to_string()];
        config.id_column = Some("ID".to_string());
        config
    }

    #[test]
    fn three_level_categorical_yields_two_indicators() {
        let t = table(
            &["ID", "Lat", "OC", "Soil_Order", "BD"],
            &[
                &["a", "1", "1.0", "Mollisol", "1.2"],
                &["b", "2", "2.0", "Alfisol", "1.3"],
                &["c", "3", "3.0", "Vertisol", "1.1"],
                &["d", "4", "4.0", "Alfisol", "1.4"],
            ],
        );
        let ds = preprocess(&t, &soil_config()).unwrap();
        assert_eq!(
            ds.feature_names,
            vec!["OC", "Soil_Order_Mollisol", "Soil_Order_Vertisol"]
        );
        assert_eq!(ds.summary.encoded[0].reference, "Alfisol");
        assert_eq!(ds.x.ncols(), 3);
        // Row "b" is the reference level: all indicators zero.
        assert_eq!(ds.x[(1, 1)], 0.0);
        assert_eq!(ds.x[(1, 2)], 0.0);
        assert_eq!(ds.x[(0, 1)], 1.0);
        assert_eq!(ds.x[(2, 2)], 1.0);
        assert_eq!(ds.sample_ids, vec!["a", "b", "c", "d"]);
        assert_eq!(ds.id_label, "ID");
    }

    #[test]
    fn sparse_column_dropped_before_row_filtering() {
        // Clay is 25% missing (2 of 8) with a 20% threshold.
        let t = table(
            &["OC", "Clay", "BD"],
            &[
                &["1", "10", "1.1"],
                &["2", "-", "1.2"],
                &["3", "12", "1.3"],
                &["4", "", "1.4"],
                &["5", "14", "1.5"],
                &["6", "15", "1.6"],
                &["7", "16", "1.7"],
                &["8", "17", "1.8"],
            ],
        );
        let ds = preprocess(&t, &PreprocessConfig::new("BD")).unwrap();
        assert_eq!(ds.feature_names, vec!["OC"]);
        assert_eq!(ds.n_samples(), 8);
        assert!(matches!(
            ds.summary.dropped_columns[0].reason,
            DropReason::TooManyMissing { fraction } if (fraction - 0.25).abs() < 1e-12
        ));
    }

    #[test]
    fn column_at_threshold_is_kept_and_rows_dropped() {
        // 1 of 5 missing is exactly 20%: kept, and the incomplete row is removed.
        let t = table(
            &["OC", "Clay", "BD"],
            &[
                &["1", "10", "1.1"],
                &["2", "n/a", "1.2"],
                &["3", "12", "1.3"],
                &["4", "13", "1.4"],
                &["5", "14", "1.5"],
            ],
        );
        let ds = preprocess(&t, &PreprocessConfig::new("BD")).unwrap();
        assert_eq!(ds.feature_names, vec!["OC", "Clay"]);
        assert_eq!(ds.n_samples(), 4);
        assert_eq!(ds.source_rows, vec![0, 2, 3, 4]);
        assert_eq!(ds.sample_ids, vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn headers_are_trimmed() {
        let t = table(&[" OC ", "\u{feff}BD "], &[&["1", "2"], &["2", "3"]]);
        let ds = preprocess(&t, &PreprocessConfig::new("BD")).unwrap();
        assert_eq!(ds.feature_names, vec!["OC"]);
        assert_eq!(ds.target, "BD");
    }

    #[test]
    fn missing_target_is_reported() {
        let t = table(&["OC", "Clay"], &[&["1", "2"]]);
        let err = preprocess(&t, &PreprocessConfig::new("BD")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingTargetColumn);

        // Target removed by the missingness filter counts as missing too.
        let t = table(&["OC", "BD"], &[&["1", "-"], &["2", "-"], &["3", "1.2"]]);
        let err = preprocess(&t, &PreprocessConfig::new("BD")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingTargetColumn);
    }

    #[test]
    fn no_complete_rows_is_empty_dataset() {
        let mut config = PreprocessConfig::new("BD");
        config.missing_threshold = 1.0;
        let t = table(&["OC", "BD"], &[&["1", "-"], &["-", "1.2"]]);
        let err = preprocess(&t, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn invalid_threshold_is_config_error() {
        let mut config = PreprocessConfig::new("BD");
        config.missing_threshold = 1.5;
        let t = table(&["BD"], &[&["1"]]);
        assert_eq!(preprocess(&t, &config).unwrap_err().kind(), ErrorKind::Config);
    }
}
