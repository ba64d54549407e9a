//! Data preparation: preprocessing of raw tables and synthetic samples.

pub mod preprocess;
pub mod sample;

pub use preprocess::*;
pub use sample::*;
