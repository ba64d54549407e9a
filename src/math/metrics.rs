//! Regression error metrics.
//!
//! Empty inputs give NaN rather than zero so an empty fold can never look like
//! a perfect one.

/// Root-mean-squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let mse = mean_of(actual.iter().zip(predicted).map(|(a, p)| (a - p) * (a - p)));
    mse.sqrt()
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_of(actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()))
}

pub fn mean(values: &[f64]) -> f64 {
    mean_of(values.iter().copied())
}

/// Sample standard deviation (n - 1 denominator); NaN for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_and_mae_basic() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.0, 2.0, 3.0, 6.0];
        assert!((rmse(&actual, &predicted) - 1.0).abs() < 1e-12);
        assert!((mae(&actual, &predicted) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_are_nan() {
        assert!(rmse(&[], &[]).is_nan());
        assert!(mae(&[], &[]).is_nan());
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&v) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }
}
