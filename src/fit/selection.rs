//! Forward stepwise feature selection by AICc.
//!
//! Starting from the intercept-only model, each round fits one OLS model per
//! remaining feature (selected ∪ {feature}) and scores it with AICc.
//!
//! Selection rules:
//! 1. The running best score starts at `+inf` and persists across rounds.
//! 2. Candidates are scanned in column order; a candidate becomes the round's
//!    pick only if it is strictly below the running best, which is then
//!    lowered to its score (first strictly-lower candidate wins ties).
//! 3. A round without a pick ends the search.
//!
//! Because the intercept-only model is never scored, the first round adds a
//! feature whenever any candidate has a finite AICc.
//!
//! Candidates whose design matrix is singular are skipped; they never abort
//! the run.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{Dataset, LinearModel, SelectionStep};
use crate::error::{AppError, ErrorKind};
use crate::models::{fit_subset, to_linear_model};

/// A candidate that could not be scored in a given round.
#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub round: usize,
    pub feature: String,
    pub reason: String,
}

/// Output of stepwise selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Final model refit on all samples with the selected features.
    pub model: LinearModel,
    /// Selected feature columns (indices into `Dataset::x`) in selection order.
    pub columns: Vec<usize>,
    /// One entry per accepted feature.
    pub steps: Vec<SelectionStep>,
    /// Candidates skipped because their fit failed (for diagnostics).
    pub skipped: Vec<SkippedCandidate>,
    /// Number of candidate features offered to the selector.
    pub candidates: usize,
}

impl Selection {
    /// Selected feature names, intercept excluded.
    pub fn feature_names(&self) -> &[String] {
        &self.model.features
    }

    pub fn is_intercept_only(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Run forward selection over every feature column of `dataset`.
///
/// Fails with `NoFeatureSelected` if the dataset has no feature columns; use
/// [`fit_intercept_only`] for that case.
pub fn select_features(dataset: &Dataset) -> Result<Selection, AppError> {
    let n = dataset.n_samples();
    let candidates = dataset.n_features();
    if candidates == 0 {
        return Err(AppError::new(
            ErrorKind::NoFeatureSelected,
            "No candidate features available for selection.",
        ));
    }

    let rows: Vec<usize> = (0..n).collect();
    let mut selected: Vec<usize> = Vec::new();
    let mut remaining: Vec<usize> = (0..candidates).collect();
    let mut best_score = f64::INFINITY;
    let mut model: Option<LinearModel> = None;
    let mut steps = Vec::new();
    let mut skipped = Vec::new();
    let mut round = 0usize;

    while !remaining.is_empty() {
        round += 1;

        // Evaluate each candidate independently (parallel); scan in column order.
        let scores: Vec<(usize, Result<f64, AppError>)> = remaining
            .par_iter()
            .map(|&cand| {
                let mut columns = selected.clone();
                columns.push(cand);
                let score = fit_subset(dataset, &rows, &columns).map(|fit| fit.stats.aicc);
                (cand, score)
            })
            .collect();

        let mut pick = None;
        let mut round_skipped = 0usize;
        for (cand, score) in scores {
            let name = &dataset.feature_names[cand];
            match score {
                Ok(score) => {
                    debug!("round {round}: `{name}` AICc={score:.4}");
                    if score < best_score {
                        best_score = score;
                        pick = Some(cand);
                    }
                }
                Err(e) => {
                    debug!("round {round}: skipping `{name}`: {e}");
                    round_skipped += 1;
                    skipped.push(SkippedCandidate {
                        round,
                        feature: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let Some(cand) = pick else {
            debug!("round {round}: no candidate below AICc={best_score:.4}, stopping");
            break;
        };

        let evaluated = remaining.len();
        remaining.retain(|&c| c != cand);
        selected.push(cand);

        let fit = fit_subset(dataset, &rows, &selected)?;
        model = Some(to_linear_model(dataset, &selected, &fit));

        info!(
            "Step {round}: added `{}` (AICc={best_score:.4}, {evaluated} candidates)",
            dataset.feature_names[cand]
        );
        steps.push(SelectionStep {
            round,
            feature: dataset.feature_names[cand].clone(),
            aicc: best_score,
            candidates_evaluated: evaluated,
            candidates_skipped: round_skipped,
        });
    }

    let model = match model {
        Some(model) => model,
        None => {
            warn!("No candidate feature produced a usable AICc; keeping the intercept-only model.");
            intercept_model(dataset)?
        }
    };

    Ok(Selection {
        model,
        columns: selected,
        steps,
        skipped,
        candidates,
    })
}

/// Degenerate selection result: the intercept-only model.
pub fn fit_intercept_only(dataset: &Dataset) -> Result<Selection, AppError> {
    Ok(Selection {
        model: intercept_model(dataset)?,
        columns: Vec::new(),
        steps: Vec::new(),
        skipped: Vec::new(),
        candidates: dataset.n_features(),
    })
}

fn intercept_model(dataset: &Dataset) -> Result<LinearModel, AppError> {
    let rows: Vec<usize> = (0..dataset.n_samples()).collect();
    let fit = fit_subset(dataset, &rows, &[])?;
    Ok(to_linear_model(dataset, &[], &fit))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-noise in [-1, 1); different salts are uncorrelated.
    fn wiggle(i: usize, salt: f64) -> f64 {
        let h = ((i as f64 + 1.0) * (12.9898 + salt * 4.1414)).sin() * 43758.5453;
        h.fract().abs() * 2.0 - 1.0
    }

    #[test]
    fn single_feature_matches_simple_regression() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &v)| 3.0 - 1.5 * v + 0.2 * wiggle(i, 0.0))
            .collect();
        let ds = Dataset::from_columns("y", &["x"], &[x.clone()], y.clone()).unwrap();

        let sel = select_features(&ds).unwrap();
        assert_eq!(sel.feature_names(), &["x".to_string()]);

        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum();
        let sxx: f64 = x.iter().map(|a| (a - mx) * (a - mx)).sum();
        let slope = sxy / sxx;
        let intercept = my - slope * mx;

        assert!((sel.model.coefficients[0] - intercept).abs() < 1e-9);
        assert!((sel.model.coefficients[1] - slope).abs() < 1e-9);
    }

    #[test]
    fn recovers_signal_features_first() {
        let n = 60;
        let x1: Vec<f64> = (0..n).map(|i| wiggle(i, 1.0) * 5.0).collect();
        let x2: Vec<f64> = (0..n).map(|i| wiggle(i, 2.0) * 3.0).collect();
        let noise_a: Vec<f64> = (0..n).map(|i| wiggle(i, 3.0)).collect();
        let noise_b: Vec<f64> = (0..n).map(|i| wiggle(i, 4.0)).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| 1.0 + 4.0 * x1[i] - x2[i] + 0.05 * wiggle(i, 5.0))
            .collect();
        let ds = Dataset::from_columns(
            "y",
            &["noise_a", "x1", "noise_b", "x2"],
            &[noise_a, x1, noise_b, x2],
            y,
        )
        .unwrap();

        let sel = select_features(&ds).unwrap();
        let names = sel.feature_names();
        assert!(names.len() >= 2 && names.len() <= 4);
        assert_eq!(names[0], "x1");
        assert_eq!(names[1], "x2");

        let mut unique = names.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());

        // Accepted scores only ever go down.
        for w in sel.steps.windows(2) {
            assert!(w[1].aicc < w[0].aicc);
        }
        assert_eq!(sel.model.coefficients.len(), names.len() + 1);
    }

    #[test]
    fn singular_candidate_is_skipped_not_fatal() {
        let x: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().enumerate().map(|(i, v)| 0.5 + v + 0.1 * wiggle(i, 0.0)).collect();
        let ds = Dataset::from_columns("y", &["x", "x_copy"], &[x.clone(), x], y).unwrap();

        let sel = select_features(&ds).unwrap();
        assert_eq!(sel.feature_names(), &["x".to_string()]);
        assert_eq!(sel.skipped.len(), 1);
        assert_eq!(sel.skipped[0].feature, "x_copy");
        assert_eq!(sel.skipped[0].round, 2);
    }

    #[test]
    fn first_round_adds_a_feature_even_without_signal() {
        let n = 30;
        let x: Vec<f64> = (0..n).map(|i| wiggle(i, 6.0)).collect();
        let y: Vec<f64> = (0..n).map(|i| wiggle(i, 7.0)).collect();
        let ds = Dataset::from_columns("y", &["x"], &[x], y).unwrap();

        let sel = select_features(&ds).unwrap();
        assert_eq!(sel.steps.len(), 1);
        assert!(!sel.is_intercept_only());
    }

    #[test]
    fn too_few_samples_keeps_intercept_only() {
        // n = 3, k = 2 → n <= k + 1, AICc is +inf for every candidate.
        let ds = Dataset::from_columns("y", &["x"], &[vec![1.0, 2.0, 4.0]], vec![1.0, 2.5, 2.0]).unwrap();
        let sel = select_features(&ds).unwrap();
        assert!(sel.is_intercept_only());
        assert!((sel.model.intercept() - 5.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_candidates_is_reported() {
        let ds = Dataset::from_columns("y", &[], &[], vec![1.0, 2.0, 3.0]).unwrap();
        let err = select_features(&ds).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFeatureSelected);

        let sel = fit_intercept_only(&ds).unwrap();
        assert!(sel.is_intercept_only());
        assert!((sel.model.intercept() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn selection_is_deterministic() {
        let n = 40;
        let cols: Vec<Vec<f64>> = (0..5)
            .map(|c| (0..n).map(|i| wiggle(i, c as f64 + 10.0)).collect())
            .collect();
        let y: Vec<f64> = (0..n).map(|i| cols[1][i] - 0.5 * cols[3][i] + 0.1 * wiggle(i, 99.0)).collect();
        let ds = Dataset::from_columns("y", &["a", "b", "c", "d", "e"], &cols, y).unwrap();

        let a = select_features(&ds).unwrap();
        let b = select_features(&ds).unwrap();
        assert_eq!(a.columns, b.columns);
        assert_eq!(a.model.coefficients, b.model.coefficients);
    }
}
