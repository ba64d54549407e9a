//! Mathematical utilities: least squares and error metrics.

pub mod metrics;
pub mod ols;

pub use metrics::*;
pub use ols::*;
