//! Reporting: model equation, coefficient tables and result packaging.
//!
//! Everything here is a pure transformation of selection/CV outputs; writing
//! files is left to `io::export`.

pub mod format;

pub use format::*;

use crate::domain::{
    CoefficientRow, Dataset, FoldMetricRow, LinearModel, OofPrediction, RankedCoefficient,
};
use crate::fit::{CrossValidation, Selection};

/// All tabular artifacts of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub target: String,
    pub equation: String,
    pub coefficients: Vec<CoefficientRow>,
    pub ranking: Vec<RankedCoefficient>,
    pub fold_metrics: Vec<FoldMetricRow>,
    pub predictions: Vec<OofPrediction>,
    /// Header of the sample label column in the predictions table.
    pub id_label: String,
}

/// Human-readable model equation, e.g. `BD = 1.4500 + (-0.0900 * OC) + (0.0025 * Sand)`.
pub fn model_equation(target: &str, model: &LinearModel) -> String {
    let mut out = format!("{target} = {:.4}", model.intercept());
    for (name, coef) in model.features.iter().zip(model.coefficients.iter().skip(1)) {
        out.push_str(&format!(" + ({coef:.4} * {name})"));
    }
    out
}

/// `{Variable, Coefficient}` rows, intercept first.
pub fn coefficient_table(model: &LinearModel) -> Vec<CoefficientRow> {
    model
        .named_coefficients()
        .into_iter()
        .map(|(name, coefficient)| CoefficientRow {
            variable: name.to_string(),
            coefficient,
        })
        .collect()
}

/// Coefficients ranked by descending magnitude (rank 1 = largest).
///
/// Equal magnitudes keep their coefficient-table order.
pub fn rank_coefficients(model: &LinearModel) -> Vec<RankedCoefficient> {
    let mut rows: Vec<(&str, f64)> = model
        .named_coefficients()
        .into_iter()
        .map(|(name, c)| (name, c.abs()))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, abs_coefficient))| RankedCoefficient {
            variable: name.to_string(),
            abs_coefficient,
            rank: i + 1,
        })
        .collect()
}

/// `{Fold, RMSE, MAE, R2}` rows.
pub fn fold_metric_rows(cv: &CrossValidation) -> Vec<FoldMetricRow> {
    cv.folds
        .iter()
        .map(|f| FoldMetricRow {
            fold: f.fold,
            rmse: f.rmse,
            mae: f.mae,
            r2: f.r2,
        })
        .collect()
}

/// Package the equation, coefficient tables, fold metrics and predictions.
pub fn build_report(dataset: &Dataset, selection: &Selection, cv: &CrossValidation) -> Report {
    Report {
        target: dataset.target.clone(),
        equation: model_equation(&dataset.target, &selection.model),
        coefficients: coefficient_table(&selection.model),
        ranking: rank_coefficients(&selection.model),
        fold_metrics: fold_metric_rows(cv),
        predictions: cv.predictions.clone(),
        id_label: dataset.id_label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitStats;

    fn model(features: &[&str], coefficients: &[f64]) -> LinearModel {
        LinearModel {
            features: features.iter().map(|s| s.to_string()).collect(),
            coefficients: coefficients.to_vec(),
            stats: FitStats {
                n: 10,
                k: coefficients.len(),
                df_resid: 10 - coefficients.len(),
                sse: 1.0,
                r_squared: 0.5,
                log_likelihood: 0.0,
                aic: 0.0,
                aicc: 0.0,
            },
        }
    }

    #[test]
    fn equation_lists_terms_in_selection_order() {
        let m = model(&["OC", "Sand"], &[1.45, -0.09, 0.0025]);
        assert_eq!(
            model_equation("BD", &m),
            "BD = 1.4500 + (-0.0900 * OC) + (0.0025 * Sand)"
        );
        assert_eq!(model_equation("BD", &model(&[], &[1.2])), "BD = 1.2000");
    }

    #[test]
    fn coefficient_table_starts_with_intercept() {
        let rows = coefficient_table(&model(&["OC"], &[1.0, -2.0]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].variable, "const");
        assert_eq!(rows[1].variable, "OC");
        assert_eq!(rows[1].coefficient, -2.0);
    }

    #[test]
    fn ranking_sorts_by_magnitude() {
        let ranked = rank_coefficients(&model(&["a", "b", "c"], &[0.5, -3.0, 1.0, 3.0]));
        let order: Vec<&str> = ranked.iter().map(|r| r.variable.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b", "const"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].abs_coefficient, 3.0);
        assert_eq!(ranked[3].rank, 4);
    }
}
