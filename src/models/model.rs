//! Linear model evaluation over a feature subset.
//!
//! Selection and cross-validation both rely on two primitive operations:
//! - build a design row (intercept + chosen columns) for a sample (for OLS)
//! - predict `y` for a sample given the coefficients (for residuals/metrics)
//!
//! Feature subsets are expressed as column indices into `Dataset::x`, so
//! nothing here copies the full data table.

use nalgebra::{DMatrix, DVector};

use crate::domain::{Dataset, LinearModel};
use crate::error::AppError;
use crate::math::{OlsFit, fit_ols};

/// Fill a design row for sample `row` using the given feature columns.
///
/// The row includes the constant term first (intercept).
///
/// # Panics
/// Panics if `out` does not have length `columns.len() + 1`.
pub fn fill_design_row(x: &DMatrix<f64>, row: usize, columns: &[usize], out: &mut [f64]) {
    out[0] = 1.0;
    for (j, &col) in columns.iter().enumerate() {
        out[j + 1] = x[(row, col)];
    }
}

/// Predict `y` for sample `row`.
pub fn predict(x: &DMatrix<f64>, row: usize, columns: &[usize], coefficients: &[f64]) -> f64 {
    columns
        .iter()
        .zip(&coefficients[1..])
        .fold(coefficients[0], |acc, (&col, &beta)| acc + beta * x[(row, col)])
}

/// Build the `rows.len() × (columns.len() + 1)` design matrix with intercept.
pub fn design_matrix(x: &DMatrix<f64>, rows: &[usize], columns: &[usize]) -> DMatrix<f64> {
    let p = columns.len() + 1;
    let mut out = DMatrix::<f64>::zeros(rows.len(), p);
    let mut row_buf = vec![0.0; p];
    for (i, &r) in rows.iter().enumerate() {
        fill_design_row(x, r, columns, &mut row_buf);
        for (j, v) in row_buf.iter().enumerate() {
            out[(i, j)] = *v;
        }
    }
    out
}

/// Fit OLS of `y` on intercept + `columns`, restricted to `rows`.
pub fn fit_subset(dataset: &Dataset, rows: &[usize], columns: &[usize]) -> Result<OlsFit, AppError> {
    let x = design_matrix(&dataset.x, rows, columns);
    let y = DVector::from_iterator(rows.len(), rows.iter().map(|&r| dataset.y[r]));
    fit_ols(&x, &y)
}

/// Convert an OLS fit over `columns` into a named `LinearModel`.
pub fn to_linear_model(dataset: &Dataset, columns: &[usize], fit: &OlsFit) -> LinearModel {
    LinearModel {
        features: columns
            .iter()
            .map(|&c| dataset.feature_names[c].clone())
            .collect(),
        coefficients: fit.coefficients.iter().copied().collect(),
        stats: fit.stats.clone(),
    }
}
