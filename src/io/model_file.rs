//! Read/write model JSON files.
//!
//! The model file is the portable record of a run:
//! - target, equation and fitted coefficients (with fit statistics)
//! - the stepwise selection trace
//! - the cross-validation summary, when CV was run
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CvSummary, ModelFile};
use crate::error::AppError;
use crate::fit::Selection;
use crate::report::model_equation;

/// Assemble the model file contents for a run.
pub fn model_file(target: &str, selection: &Selection, cv: Option<&CvSummary>) -> ModelFile {
    ModelFile {
        tool: "bd".to_string(),
        generated_at: Utc::now(),
        target: target.to_string(),
        equation: model_equation(target, &selection.model),
        model: selection.model.clone(),
        selection: selection.steps.clone(),
        cv: cv.cloned(),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::io(format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let model: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid model JSON: {e}")))?;
    Ok(model)
}
