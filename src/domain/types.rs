//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during preprocessing, selection and cross-validation
//! - exported to CSV/JSON
//! - printed in terminal summaries

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Deserializer, Serialize};

/// Name used for the intercept term in coefficient tables and equations.
pub const INTERCEPT_NAME: &str = "const";

/// Default placeholder that marks a missing cell in soil survey exports.
pub const DEFAULT_SENTINEL: &str = "-";

/// Default maximum missing fraction before a numeric column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.20;

/// Default number of cross-validation folds.
pub const DEFAULT_FOLDS: usize = 10;

/// Default seed for the fold shuffle.
pub const DEFAULT_SEED: u64 = 42;

/// A raw table as supplied by a loader: header names plus string cells.
///
/// Rows are not guaranteed to have the same length as the header; short rows
/// are treated as having missing trailing cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `(row, col)`, or `""` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Which R² is recorded per cross-validation fold.
///
/// `Train` reproduces the established behaviour: the in-sample R² of the model
/// fitted on the fold's training rows. `Holdout` scores the held-out rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FoldR2 {
    Train,
    Holdout,
}

/// Column conventions and missing-value policy for preprocessing.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub target: String,
    pub categorical: Vec<String>,
    pub drop_columns: Vec<String>,
    /// Column used only to label samples in reports (never a feature).
    pub id_column: Option<String>,
    pub missing_sentinels: Vec<String>,
    pub missing_threshold: f64,
}

impl PreprocessConfig {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            categorical: Vec::new(),
            drop_columns: Vec::new(),
            id_column: None,
            missing_sentinels: vec![DEFAULT_SENTINEL.to_string()],
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
        }
    }
}

/// Cross-validation settings.
#[derive(Debug, Clone)]
pub struct CvConfig {
    pub folds: usize,
    pub seed: u64,
    pub fold_r2: FoldR2,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            folds: DEFAULT_FOLDS,
            seed: DEFAULT_SEED,
            fold_r2: FoldR2::Train,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults); the pipeline never
/// reads process-wide state itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub delimiter: u8,
    pub preprocess: PreprocessConfig,
    pub cv: CvConfig,
    pub export_dir: Option<PathBuf>,
    pub export_model: Option<PathBuf>,
}

/// Why a column did not make it into the design matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// Listed in `drop_columns` (identifiers, coordinates, ...).
    Configured,
    /// Missing fraction exceeded the threshold.
    TooManyMissing { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedColumn {
    pub name: String,
    pub reason: DropReason,
}

/// Levels observed for a categorical column after row filtering.
#[derive(Debug, Clone)]
pub struct EncodedCategory {
    pub column: String,
    /// Level absorbed into the intercept.
    pub reference: String,
    /// Levels that received an indicator column, in column order.
    pub indicators: Vec<String>,
}

/// What preprocessing did to the raw table.
#[derive(Debug, Clone, Default)]
pub struct PreprocessSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped_columns: Vec<DroppedColumn>,
    pub encoded: Vec<EncodedCategory>,
}

/// Clean numeric modeling data: design matrix, target and sample labels.
///
/// The intercept column is implicit; `x` holds feature columns only.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub target: String,
    pub feature_names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    /// Header for the sample labels in exports.
    pub id_label: String,
    pub sample_ids: Vec<String>,
    /// 0-based index of each sample in the raw table.
    pub source_rows: Vec<usize>,
    pub summary: PreprocessSummary,
}

impl Dataset {
    /// Build a dataset directly from clean numeric columns.
    ///
    /// Samples are labeled by 1-based position. Returns `None` if the column
    /// count does not match `names` or any column length differs from `y`.
    pub fn from_columns(target: &str, names: &[&str], columns: &[Vec<f64>], y: Vec<f64>) -> Option<Self> {
        let n = y.len();
        if names.len() != columns.len() || columns.iter().any(|c| c.len() != n) {
            return None;
        }
        Some(Self {
            target: target.to_string(),
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            x: DMatrix::from_fn(n, columns.len(), |i, j| columns[j][i]),
            y: DVector::from_vec(y),
            id_label: "Sample".to_string(),
            sample_ids: (1..=n).map(|i| i.to_string()).collect(),
            source_rows: (0..n).collect(),
            summary: PreprocessSummary {
                rows_in: n,
                rows_out: n,
                ..Default::default()
            },
        })
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|f| f == name)
    }
}

/// Fit quality diagnostics for an OLS model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitStats {
    pub n: usize,
    /// Parameter count, intercept included.
    pub k: usize,
    pub df_resid: usize,
    #[serde(deserialize_with = "null_as_nan")]
    pub sse: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub r_squared: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub log_likelihood: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub aic: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub aicc: f64,
}

/// Fitted linear model: intercept plus one coefficient per feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Selected feature names, intercept excluded.
    pub features: Vec<String>,
    /// Intercept first, then one entry per feature.
    pub coefficients: Vec<f64>,
    pub stats: FitStats,
}

impl LinearModel {
    pub fn intercept(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or(0.0)
    }

    /// `(name, coefficient)` pairs, intercept first.
    pub fn named_coefficients(&self) -> Vec<(&str, f64)> {
        std::iter::once(INTERCEPT_NAME)
            .chain(self.features.iter().map(String::as_str))
            .zip(self.coefficients.iter().copied())
            .collect()
    }
}

/// One accepted step of forward selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionStep {
    pub round: usize,
    pub feature: String,
    #[serde(deserialize_with = "null_as_nan")]
    pub aicc: f64,
    pub candidates_evaluated: usize,
    pub candidates_skipped: usize,
}

/// Per-fold cross-validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldResult {
    /// 1-based fold number.
    pub fold: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    /// Intercept first, then the selected features.
    pub coefficients: Vec<f64>,
}

/// An out-of-fold prediction for a single sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OofPrediction {
    pub fold: usize,
    pub source_row: usize,
    pub sample_id: String,
    pub actual: f64,
    pub predicted: f64,
}

/// Aggregate cross-validation metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvSummary {
    pub folds: usize,
    pub seed: u64,
    pub fold_r2: FoldR2,
    #[serde(deserialize_with = "null_as_nan")]
    pub mean_rmse: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub std_rmse: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub mean_mae: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub std_mae: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub mean_r2: f64,
    /// RMSE over all out-of-fold predictions pooled together.
    #[serde(deserialize_with = "null_as_nan")]
    pub pooled_rmse: f64,
    #[serde(deserialize_with = "null_as_nan")]
    pub pooled_mae: f64,
}

/// Row of the coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    #[serde(rename = "Variable")]
    pub variable: String,
    #[serde(rename = "Coefficient")]
    pub coefficient: f64,
}

/// Row of the coefficient ranking table (descending magnitude).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCoefficient {
    #[serde(rename = "Variable")]
    pub variable: String,
    #[serde(rename = "AbsCoefficient")]
    pub abs_coefficient: f64,
    #[serde(rename = "Rank")]
    pub rank: usize,
}

/// Row of the fold metrics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldMetricRow {
    #[serde(rename = "Fold")]
    pub fold: usize,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

/// serde_json writes non-finite floats as `null`; read them back as NaN.
fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub target: String,
    pub equation: String,
    pub model: LinearModel,
    pub selection: Vec<SelectionStep>,
    pub cv: Option<CvSummary>,
}
