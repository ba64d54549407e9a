//! Input/output helpers.
//!
//! - CSV ingest into a raw table (`ingest`)
//! - report exports (CSV/text) (`export`)
//! - model JSON read/write (`model_file`)

pub mod export;
pub mod ingest;
pub mod model_file;

pub use export::*;
pub use ingest::*;
pub use model_file::*;
