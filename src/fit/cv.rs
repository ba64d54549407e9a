//! k-fold cross-validation of a fixed feature subset.
//!
//! The feature subset chosen on the full data is reused unchanged in every
//! fold: each fold refits OLS on its training rows and scores the held-out
//! rows. There is no re-selection per fold.
//!
//! The recorded per-fold R² defaults to the *training* fit's in-sample R²;
//! `FoldR2::Holdout` scores the held-out rows instead.

use log::{debug, info, warn};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::{CvConfig, CvSummary, Dataset, FoldR2, FoldResult, OofPrediction};
use crate::error::{AppError, ErrorKind};
use crate::math::{metrics, r_squared};
use crate::models::{fit_subset, predict};

/// Output of a cross-validation run.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    /// Test-row indices (into the dataset) per fold, ascending.
    pub partition: Vec<Vec<usize>>,
    pub folds: Vec<FoldResult>,
    /// Out-of-fold predictions in fold order.
    pub predictions: Vec<OofPrediction>,
    pub summary: CvSummary,
}

/// Randomly assign `0..n` to `k` disjoint folds.
///
/// The indices are shuffled with a `StdRng` seeded from `seed` and cut into
/// contiguous chunks; the first `n % k` folds receive one extra sample. Each
/// fold is returned sorted.
pub fn fold_partition(n: usize, k: usize, seed: u64) -> Result<Vec<Vec<usize>>, AppError> {
    if k < 2 {
        return Err(AppError::config(format!("Fold count must be >= 2 (got {k}).")));
    }
    if k > n {
        return Err(AppError::new(
            ErrorKind::InsufficientSamples,
            format!("Cannot split {n} samples into {k} folds."),
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for f in 0..k {
        let size = base + usize::from(f < extra);
        let mut fold = indices[start..start + size].to_vec();
        fold.sort_unstable();
        folds.push(fold);
        start += size;
    }
    Ok(folds)
}

/// Cross-validate OLS on `columns` (feature indices, intercept implied).
///
/// A failed fold fit aborts the whole run.
pub fn cross_validate(dataset: &Dataset, columns: &[usize], config: &CvConfig) -> Result<CrossValidation, AppError> {
    let partition = fold_partition(dataset.n_samples(), config.folds, config.seed)?;
    info!(
        "Cross-validating {} features over {} folds (seed={}).",
        columns.len(),
        config.folds,
        config.seed
    );

    // Folds are independent; evaluate in parallel and keep fold order.
    let outcomes: Vec<Result<(FoldResult, Vec<OofPrediction>), AppError>> = partition
        .par_iter()
        .enumerate()
        .map(|(i, test)| evaluate_fold(dataset, columns, i + 1, test, config.fold_r2))
        .collect();

    let mut folds = Vec::with_capacity(partition.len());
    let mut predictions = Vec::with_capacity(dataset.n_samples());
    for outcome in outcomes {
        let (fold, preds) = outcome?;
        folds.push(fold);
        predictions.extend(preds);
    }

    let summary = summarize(&folds, &predictions, config);
    info!(
        "CV: mean RMSE={:.4} mean MAE={:.4} mean R2={:.4}",
        summary.mean_rmse, summary.mean_mae, summary.mean_r2
    );

    Ok(CrossValidation {
        partition,
        folds,
        predictions,
        summary,
    })
}

fn evaluate_fold(
    dataset: &Dataset,
    columns: &[usize],
    fold: usize,
    test: &[usize],
    fold_r2: FoldR2,
) -> Result<(FoldResult, Vec<OofPrediction>), AppError> {
    let n = dataset.n_samples();
    let mut in_test = vec![false; n];
    for &r in test {
        in_test[r] = true;
    }
    let train: Vec<usize> = (0..n).filter(|&r| !in_test[r]).collect();

    let fit = fit_subset(dataset, &train, columns)
        .map_err(|e| AppError::new(e.kind(), format!("Fold {fold}: {e}")))?;
    let coefficients: Vec<f64> = fit.coefficients.iter().copied().collect();

    let actual: Vec<f64> = test.iter().map(|&r| dataset.y[r]).collect();
    let predicted: Vec<f64> = test
        .iter()
        .map(|&r| predict(&dataset.x, r, columns, &coefficients))
        .collect();

    let rmse = metrics::rmse(&actual, &predicted);
    let mae = metrics::mae(&actual, &predicted);
    let r2 = match fold_r2 {
        FoldR2::Train => fit.stats.r_squared,
        FoldR2::Holdout => r_squared(&actual, &predicted),
    };

    if !(rmse.is_finite() && mae.is_finite() && r2.is_finite()) {
        warn!("Fold {fold}: non-finite metric (RMSE={rmse}, MAE={mae}, R2={r2}).");
    }
    debug!(
        "Fold {fold}: train={} test={} RMSE={rmse:.4} MAE={mae:.4} R2={r2:.4}",
        train.len(),
        test.len()
    );

    let preds = test
        .iter()
        .zip(&predicted)
        .map(|(&r, &p)| OofPrediction {
            fold,
            source_row: dataset.source_rows[r],
            sample_id: dataset.sample_ids[r].clone(),
            actual: dataset.y[r],
            predicted: p,
        })
        .collect();

    Ok((
        FoldResult {
            fold,
            n_train: train.len(),
            n_test: test.len(),
            rmse,
            mae,
            r2,
            coefficients,
        },
        preds,
    ))
}

fn summarize(folds: &[FoldResult], predictions: &[OofPrediction], config: &CvConfig) -> CvSummary {
    let rmses: Vec<f64> = folds.iter().map(|f| f.rmse).collect();
    let maes: Vec<f64> = folds.iter().map(|f| f.mae).collect();
    let r2s: Vec<f64> = folds.iter().map(|f| f.r2).collect();
    let actual: Vec<f64> = predictions.iter().map(|p| p.actual).collect();
    let predicted: Vec<f64> = predictions.iter().map(|p| p.predicted).collect();

    CvSummary {
        folds: folds.len(),
        seed: config.seed,
        fold_r2: config.fold_r2,
        mean_rmse: metrics::mean(&rmses),
        std_rmse: metrics::std_dev(&rmses),
        mean_mae: metrics::mean(&maes),
        std_mae: metrics::std_dev(&maes),
        mean_r2: metrics::mean(&r2s),
        pooled_rmse: metrics::rmse(&actual, &predicted),
        pooled_mae: metrics::mae(&actual, &predicted),
    }
}
