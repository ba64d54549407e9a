//! Small-sample corrected Akaike information criterion.
//!
//! ```text
//! AICc = AIC + 2k(k+1) / (n - k - 1)
//! ```
//!
//! where `k` counts every estimated coefficient including the intercept.
//! When `n <= k + 1` the correction is undefined and the score is `+inf`, so an
//! overparameterized candidate can never win a comparison.

/// Corrected AIC for a fit with `n` samples and `k` parameters. Lower is better.
pub fn aicc(aic: f64, n: usize, k: usize) -> f64 {
    if n <= k + 1 {
        return f64::INFINITY;
    }
    let k_f = k as f64;
    aic + 2.0 * k_f * (k_f + 1.0) / (n - k - 1) as f64
}
