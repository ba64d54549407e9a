//! Ordinary least squares solver.
//!
//! Every model in this project is a plain linear regression:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! solved many times during stepwise selection (once per candidate per round)
//! and once per cross-validation fold.
//!
//! Implementation choices:
//! - We use SVD so tall design matrices (more rows than columns) are handled
//!   directly. (Nalgebra's `QR::solve` is intended for square systems and will
//!   panic for non-square matrices.)
//! - Before solving we check the numerical rank. A rank-deficient design
//!   (collinear columns, or fewer rows than columns) is reported as
//!   `SingularMatrix` rather than silently returning a minimum-norm solution,
//!   because coefficients of collinear columns are not identified.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use crate::domain::FitStats;
use crate::error::{AppError, ErrorKind};
use crate::fit::aicc;

/// Solve a least squares problem using SVD.
///
/// Fails with `SingularMatrix` if the design matrix does not have full column rank.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, AppError> {
    let (n, k) = x.shape();
    if n != y.len() {
        return Err(AppError::new(
            ErrorKind::Numeric,
            format!("Design matrix has {n} rows but target has {} values.", y.len()),
        ));
    }
    if n == 0 || k == 0 {
        return Err(AppError::new(ErrorKind::Numeric, "Cannot fit an empty design matrix."));
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !max_sv.is_finite() {
        return Err(AppError::new(ErrorKind::Numeric, "Non-finite values in design matrix."));
    }

    // Same relative cutoff as LAPACK-based rank estimates.
    let tol = max_sv * (n.max(k) as f64) * f64::EPSILON;
    let rank = svd.rank(tol);
    if rank < k {
        return Err(AppError::new(
            ErrorKind::SingularMatrix,
            format!("Design matrix is rank deficient (rank {rank} < {k} columns)."),
        ));
    }

    let beta = svd
        .solve(y, tol)
        .map_err(|e| AppError::new(ErrorKind::SingularMatrix, format!("Least squares solve failed: {e}")))?;
    if !beta.iter().all(|v| v.is_finite()) {
        return Err(AppError::new(ErrorKind::Numeric, "Least squares produced non-finite coefficients."));
    }
    Ok(beta)
}

/// An OLS fit with its in-sample diagnostics.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: DVector<f64>,
    pub fitted: DVector<f64>,
    pub stats: FitStats,
}

/// Fit OLS on a design matrix that already contains the intercept column.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit, AppError> {
    let coefficients = solve_least_squares(x, y)?;
    let fitted = x * &coefficients;
    let sse = (y - &fitted).norm_squared();
    let stats = fit_stats(y, sse, x.ncols());
    Ok(OlsFit {
        coefficients,
        fitted,
        stats,
    })
}

/// Gaussian log-likelihood and information criteria for a fit with `k` parameters.
///
/// A perfect fit (`sse == 0`) yields `aic = -inf`; this is not clamped.
pub fn fit_stats(y: &DVector<f64>, sse: f64, k: usize) -> FitStats {
    let n = y.len();
    let n_f = n as f64;
    let log_likelihood = -0.5 * n_f * ((2.0 * PI).ln() + (sse / n_f).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k as f64;

    FitStats {
        n,
        k,
        df_resid: n.saturating_sub(k),
        sse,
        r_squared: 1.0 - sse / total_sum_of_squares(y.as_slice()),
        log_likelihood,
        aic,
        aicc: aicc(aic, n, k),
    }
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// Constant `actual` gives NaN (or -inf); callers surface it as is.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    1.0 - sse / total_sum_of_squares(actual)
}

fn total_sum_of_squares(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}
