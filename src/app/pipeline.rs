//! Shared pipeline logic used by the `fit` and `select` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> preprocessing -> stepwise selection -> k-fold CV -> report
//!
//! The command handlers can then focus on presentation (printing vs exports).

use log::{info, warn};

use crate::data::preprocess;
use crate::domain::{CvConfig, Dataset, PipelineConfig, PreprocessConfig, RawTable};
use crate::error::{AppError, ErrorKind};
use crate::fit::{CrossValidation, Selection, cross_validate, fit_intercept_only, select_features};
use crate::io::ingest::{IngestedTable, load_table};
use crate::report::{Report, build_report};

/// All computed outputs of a single `bd fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedTable,
    pub dataset: Dataset,
    pub selection: Selection,
    pub cv: CrossValidation,
    pub report: Report,
}

/// Execute the full pipeline on the configured input file.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let ingest = load_table(&config.input, config.delimiter)?;
    run_pipeline_on_table(ingest, &config.preprocess, &config.cv)
}

/// Execute the pipeline on an already loaded table.
pub fn run_pipeline_on_table(
    ingest: IngestedTable,
    preprocess_config: &PreprocessConfig,
    cv_config: &CvConfig,
) -> Result<RunOutput, AppError> {
    let (dataset, selection) = prepare_and_select(&ingest.table, preprocess_config)?;

    let cv = cross_validate(&dataset, &selection.columns, cv_config)?;
    let report = build_report(&dataset, &selection, &cv);
    info!(
        "Pipeline complete: {} features, pooled out-of-fold RMSE={:.4}.",
        selection.columns.len(),
        cv.summary.pooled_rmse
    );

    Ok(RunOutput {
        ingest,
        dataset,
        selection,
        cv,
        report,
    })
}

/// Preprocess `table` and run stepwise selection on the result.
///
/// A dataset without candidate features falls back to the intercept-only
/// model so the run can still be cross-validated.
pub fn prepare_and_select(table: &RawTable, config: &PreprocessConfig) -> Result<(Dataset, Selection), AppError> {
    let dataset = preprocess(table, config)?;

    let selection = match select_features(&dataset) {
        Ok(selection) => selection,
        Err(err) if err.kind() == ErrorKind::NoFeatureSelected => {
            warn!("{err} Fitting the intercept-only model.");
            fit_intercept_only(&dataset)?
        }
        Err(err) => return Err(err),
    };
    info!("Selected features: [{}]", selection.feature_names().join(", "));

    Ok((dataset, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::FoldR2;

    fn sample_ingest(seed: u64) -> IngestedTable {
        let table = generate_sample(&SampleConfig {
            seed,
            ..SampleConfig::default()
        })
        .unwrap();
        let rows_read = table.n_rows();
        IngestedTable {
            table,
            row_errors: Vec::new(),
            rows_read,
        }
    }

    fn survey_config() -> PreprocessConfig {
        PreprocessConfig {
            categorical: vec!["Soil_Order".to_string()],
            drop_columns: vec!["Sample_ID".to_string(), "Lat".to_string(), "Lon".to_string()],
            id_column: Some("Sample_ID".to_string()),
            ..PreprocessConfig::new("BD")
        }
    }

    #[test]
    fn synthetic_survey_recovers_main_drivers() {
        let run = run_pipeline_on_table(sample_ingest(7), &survey_config(), &CvConfig::default()).unwrap();

        let features = run.selection.feature_names();
        for expected in ["OC", "Sand", "Depth", "Soil_Order_Andisol"] {
            assert!(features.iter().any(|f| f == expected), "{expected} not in {features:?}");
        }
        assert!(!features.iter().any(|f| f == "CEC"));
        assert!(
            run.dataset
                .summary
                .dropped_columns
                .iter()
                .any(|d| d.name == "CEC")
        );

        let oc = run.selection.model.features.iter().position(|f| f == "OC").unwrap();
        let oc_coef = run.selection.model.coefficients[oc + 1];
        assert!((oc_coef + 0.09).abs() < 0.02, "OC coefficient {oc_coef}");

        assert_eq!(run.cv.folds.len(), 10);
        assert_eq!(run.report.predictions.len(), run.dataset.n_samples());
        assert!(run.cv.summary.pooled_rmse < 0.1);
        assert_eq!(run.report.id_label, "Sample_ID");
        assert!(run.report.predictions.iter().all(|p| p.sample_id.starts_with('S')));
    }

    #[test]
    fn same_input_same_results() {
        let cv = CvConfig {
            folds: 5,
            seed: 11,
            fold_r2: FoldR2::Holdout,
        };
        let a = run_pipeline_on_table(sample_ingest(3), &survey_config(), &cv).unwrap();
        let b = run_pipeline_on_table(sample_ingest(3), &survey_config(), &cv).unwrap();

        assert_eq!(a.selection.feature_names(), b.selection.feature_names());
        assert_eq!(a.selection.model.coefficients, b.selection.model.coefficients);
        assert_eq!(a.cv.partition, b.cv.partition);
        assert_eq!(a.report.equation, b.report.equation);
    }

    #[test]
    fn no_candidates_falls_back_to_intercept_only() {
        let table = RawTable::new(
            vec!["Sample_ID".to_string(), "BD".to_string()],
            (0..6)
                .map(|i| vec![format!("S{i}"), format!("{}", 1.2 + 0.01 * i as f64)])
                .collect(),
        );
        let config = PreprocessConfig {
            drop_columns: vec!["Sample_ID".to_string()],
            ..PreprocessConfig::new("BD")
        };
        let cv = CvConfig {
            folds: 3,
            ..CvConfig::default()
        };
        let run = run_pipeline_on_table(
            IngestedTable {
                table,
                row_errors: Vec::new(),
                rows_read: 6,
            },
            &config,
            &cv,
        )
        .unwrap();

        assert!(run.selection.is_intercept_only());
        assert_eq!(run.report.equation, "BD = 1.2250");
        assert_eq!(run.cv.folds.len(), 3);
    }

    #[test]
    fn missing_target_is_reported() {
        let config = PreprocessConfig::new("Bulk_Density");
        let err = run_pipeline_on_table(sample_ingest(1), &config, &CvConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingTargetColumn);
    }
}
