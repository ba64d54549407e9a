//! Synthetic soil survey generation.
//!
//! Produces a table shaped like a real bulk-density survey export: identifier
//! and coordinate columns, numeric covariates with sentinel-marked gaps, one
//! sparsely populated lab measurement, a soil order category and the `BD`
//! target. Used by `bd demo` and by pipeline tests.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DEFAULT_SENTINEL, RawTable};
use crate::error::{AppError, ErrorKind};

/// Soil orders and their additive effect on bulk density (g/cm³).
const SOIL_ORDERS: [(&str, f64); 4] = [
    ("Alfisol", 0.0),
    ("Andisol", -0.25),
    ("Mollisol", -0.05),
    ("Vertisol", 0.04),
];

/// Fraction of missing values in the sparse `CEC` column.
const SPARSE_MISSING_RATE: f64 = 0.35;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// Standard deviation of the Gaussian noise on `BD`.
    pub noise_sd: f64,
    /// Per-cell probability that a covariate is replaced by the sentinel.
    pub missing_rate: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 150,
            seed: 7,
            noise_sd: 0.03,
            missing_rate: 0.03,
        }
    }
}

/// Column headers of the generated table.
pub const SAMPLE_HEADERS: [&str; 11] = [
    "Sample_ID",
    "Lat",
    "Lon",
    "Depth",
    "OC",
    "Clay",
    "Sand",
    "pH",
    "CEC",
    "Soil_Order",
    "BD",
];

/// True bulk density model behind the generated data (without noise).
pub fn true_bulk_density(depth: f64, oc: f64, sand: f64, order_effect: f64) -> f64 {
    1.45 - 0.09 * oc + 0.0025 * sand + 0.0015 * depth + order_effect
}

pub fn generate_sample(config: &SampleConfig) -> Result<RawTable, AppError> {
    if config.rows == 0 {
        return Err(AppError::config("Sample row count must be > 0."));
    }
    if !(0.0..1.0).contains(&config.missing_rate) {
        return Err(AppError::config("Missing rate must be within [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sd)
        .map_err(|e| AppError::new(ErrorKind::Config, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let lat = rng.gen_range(-38.0..-28.0);
        let lon = rng.gen_range(140.0..152.0);
        let depth = rng.gen_range(0.0..100.0_f64).round();
        let oc = rng.gen_range(0.2..6.0);
        let clay = rng.gen_range(5.0..60.0);
        let sand = rng.gen_range(5.0..(95.0 - clay));
        let ph = rng.gen_range(4.5..8.5);
        let cec = rng.gen_range(2.0..40.0);
        let (order, effect) = SOIL_ORDERS[rng.gen_range(0..SOIL_ORDERS.len())];

        let bd: f64 = true_bulk_density(depth, oc, sand, effect) + noise.sample(&mut rng);

        let mut covariate = |v: f64, rate: f64| {
            if rng.gen_bool(rate) {
                DEFAULT_SENTINEL.to_string()
            } else {
                format!("{v:.3}")
            }
        };
        let row = vec![
            format!("S{:04}", i + 1),
            format!("{lat:.5}"),
            format!("{lon:.5}"),
            format!("{depth:.0}"),
            covariate(oc, config.missing_rate),
            covariate(clay, config.missing_rate),
            covariate(sand, config.missing_rate),
            covariate(ph, config.missing_rate),
            covariate(cec, SPARSE_MISSING_RATE),
            order.to_string(),
            format!("{bd:.4}"),
        ];
        rows.push(row);
    }

    Ok(RawTable::new(
        SAMPLE_HEADERS.iter().map(|s| s.to_string()).collect(),
        rows,
    ))
}
