//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration objects (`PreprocessConfig`, `CvConfig`, `PipelineConfig`)
//! - the raw and cleaned data containers (`RawTable`, `Dataset`)
//! - fit outputs (`LinearModel`, `FoldResult`, report rows, etc.)

pub mod types;

pub use types::*;
