//! Variable selection and validation.
//!
//! Responsibilities:
//!
//! - score fitted models with AICc
//! - grow a feature subset by forward stepwise selection (parallel per round)
//! - cross-validate the selected subset with a seeded k-fold split

pub mod aicc;
pub mod cv;
pub mod selection;

pub use aicc::*;
pub use cv::*;
pub use selection::*;
