//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/selection code stays clean and testable
//! - output changes are localized

use crate::domain::{Dataset, DropReason, ModelFile};
use crate::fit::{CrossValidation, Selection};
use crate::report::Report;

/// Format the full run summary (dataset + selection trace + CV metrics).
pub fn format_run_summary(dataset: &Dataset, selection: &Selection, cv: &CrossValidation, report: &Report) -> String {
    let mut out = String::new();

    out.push_str("=== bd - Bulk Density Stepwise Regression ===\n");
    out.push_str(&format_dataset(dataset));
    out.push('\n');
    out.push_str(&format_selection(selection));
    out.push('\n');
    out.push_str(&format!("Equation:\n  {}\n\n", report.equation));

    out.push_str("Coefficients (ranked by |coefficient|):\n");
    out.push_str(&format!("{:<4} {:<28} {:>14}\n", "rank", "variable", "coefficient"));
    out.push_str(&format!("{:-<4} {:-<28} {:-<14}\n", "", "", ""));
    for r in &report.ranking {
        let signed = report
            .coefficients
            .iter()
            .find(|c| c.variable == r.variable)
            .map(|c| c.coefficient)
            .unwrap_or(f64::NAN);
        out.push_str(&format!(
            "{:<4} {:<28} {:>14}\n",
            r.rank,
            truncate(&r.variable, 28),
            fmt_metric(signed)
        ));
    }
    out.push('\n');

    out.push_str(&format_cv(cv));
    out
}

/// Dataset provenance: rows kept, columns dropped, categorical encoding.
pub fn format_dataset(dataset: &Dataset) -> String {
    let s = &dataset.summary;
    let mut out = String::new();
    out.push_str(&format!("Target: {}\n", dataset.target));
    out.push_str(&format!(
        "Rows: {} read | {} complete | {} candidate features\n",
        s.rows_in,
        s.rows_out,
        dataset.n_features()
    ));
    for col in &s.dropped_columns {
        let reason = match col.reason {
            DropReason::Configured => "configured".to_string(),
            DropReason::TooManyMissing { fraction } => format!("{:.1}% missing", fraction * 100.0),
        };
        out.push_str(&format!("  (dropped {}) {reason}\n", col.name));
    }
    for enc in &s.encoded {
        out.push_str(&format!(
            "  (encoded {}) reference={} indicators=[{}]\n",
            enc.column,
            enc.reference,
            enc.indicators.join(", ")
        ));
    }
    out
}

/// Stepwise trace: one line per accepted feature plus skipped candidates.
pub fn format_selection(selection: &Selection) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Stepwise selection (AICc), {} candidates:\n",
        selection.candidates
    ));
    if selection.steps.is_empty() {
        out.push_str("  intercept-only model\n");
    }
    for step in &selection.steps {
        out.push_str(&format!(
            "  {:>2}. {:<28} AICc={:>12} ({} evaluated, {} skipped)\n",
            step.round,
            truncate(&step.feature, 28),
            fmt_metric(step.aicc),
            step.candidates_evaluated,
            step.candidates_skipped
        ));
    }
    for s in &selection.skipped {
        out.push_str(&format!("  (skipped {} in round {}) {}\n", s.feature, s.round, s.reason));
    }
    let stats = &selection.model.stats;
    out.push_str(&format!(
        "Final fit: n={} k={} R2={} AIC={} AICc={}\n",
        stats.n,
        stats.k,
        fmt_metric(stats.r_squared),
        fmt_metric(stats.aic),
        fmt_metric(stats.aicc)
    ));
    out
}

/// Per-fold table plus aggregate metrics.
pub fn format_cv(cv: &CrossValidation) -> String {
    let s = &cv.summary;
    let mut out = String::new();
    out.push_str(&format!(
        "Cross-validation: {} folds, seed={}, R2={:?}\n",
        s.folds, s.seed, s.fold_r2
    ));
    out.push_str(&format!(
        "{:>4} {:>6} {:>6} {:>12} {:>12} {:>12}\n",
        "fold", "train", "test", "RMSE", "MAE", "R2"
    ));
    out.push_str(&format!(
        "{:->4} {:->6} {:->6} {:->12} {:->12} {:->12}\n",
        "", "", "", "", "", ""
    ));
    for f in &cv.folds {
        out.push_str(&format!(
            "{:>4} {:>6} {:>6} {:>12} {:>12} {:>12}\n",
            f.fold,
            f.n_train,
            f.n_test,
            fmt_metric(f.rmse),
            fmt_metric(f.mae),
            fmt_metric(f.r2)
        ));
    }
    out.push_str(&format!(
        "mean RMSE={} (sd {}) | mean MAE={} (sd {}) | mean R2={}\n",
        fmt_metric(s.mean_rmse),
        fmt_metric(s.std_rmse),
        fmt_metric(s.mean_mae),
        fmt_metric(s.std_mae),
        fmt_metric(s.mean_r2)
    ));
    out.push_str(&format!(
        "pooled out-of-fold RMSE={} MAE={}\n",
        fmt_metric(s.pooled_rmse),
        fmt_metric(s.pooled_mae)
    ));
    out
}

/// Saved model: equation, coefficients, selection trace and CV summary.
pub fn format_model_file(model: &ModelFile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Model for {} (generated {} by {})\n",
        model.target,
        model.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        model.tool
    ));
    out.push_str(&format!("  {}\n\n", model.equation));

    out.push_str(&format!("{:<28} {:>14}\n", "variable", "coefficient"));
    out.push_str(&format!("{:-<28} {:-<14}\n", "", ""));
    for (name, coef) in model.model.named_coefficients() {
        out.push_str(&format!("{:<28} {:>14}\n", truncate(name, 28), fmt_metric(coef)));
    }

    let stats = &model.model.stats;
    out.push_str(&format!(
        "n={} k={} R2={} AICc={}\n",
        stats.n,
        stats.k,
        fmt_metric(stats.r_squared),
        fmt_metric(stats.aicc)
    ));
    for step in &model.selection {
        out.push_str(&format!(
            "  {:>2}. {:<28} AICc={}\n",
            step.round,
            truncate(&step.feature, 28),
            fmt_metric(step.aicc)
        ));
    }
    if let Some(cv) = &model.cv {
        out.push_str(&format!(
            "CV ({} folds, seed={}): mean RMSE={} mean MAE={} mean R2={} pooled RMSE={}\n",
            cv.folds,
            cv.seed,
            fmt_metric(cv.mean_rmse),
            fmt_metric(cv.mean_mae),
            fmt_metric(cv.mean_r2),
            fmt_metric(cv.pooled_rmse)
        ));
    }
    out
}

/// Fixed-precision number; NaN/inf are printed verbatim, never hidden.
fn fmt_metric(v: f64) -> String {
    if v.is_finite() { format!("{v:.4}") } else { format!("{v}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
