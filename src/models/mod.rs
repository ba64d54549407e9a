//! Linear model helpers shared by selection and cross-validation.
//!
//! Models are implemented as small, pure functions over column indices so that
//! fitting/search code can stay generic.

pub mod model;

pub use model::*;
