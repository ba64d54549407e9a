//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - runs preprocessing, stepwise selection and cross-validation
//! - prints reports
//! - writes optional exports

use clap::Parser;
use log::{debug, info};

use crate::cli::{Command, DataArgs, DemoArgs, FitArgs, ShowArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{CvConfig, PipelineConfig, PreprocessConfig};
use crate::error::AppError;
use crate::io::ingest::{load_table, parse_delimiter};

pub mod pipeline;

/// Entry point for the `bd` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; flags and real env vars still apply.
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded defaults from '{}'.", path.display());
    }
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Select(args) => handle_select(args),
        Command::Show(args) => handle_show(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args)?;
    let run = pipeline::run_pipeline(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.dataset, &run.selection, &run.cv, &run.report)
    );

    // Optional exports.
    if let Some(dir) = &config.export_dir {
        for path in crate::io::export::write_report(dir, &run.report)? {
            println!("wrote {}", path.display());
        }
    }
    if let Some(path) = &config.export_model {
        let model = crate::io::model_file::model_file(&run.dataset.target, &run.selection, Some(&run.cv.summary));
        crate::io::model_file::write_model_json(path, &model)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_select(args: DataArgs) -> Result<(), AppError> {
    let delimiter = parse_delimiter(&args.delimiter)?;
    let preprocess = preprocess_config_from_args(&args);
    let ingest = load_table(&args.input, delimiter)?;
    let (dataset, selection) = pipeline::prepare_and_select(&ingest.table, &preprocess)?;

    println!("{}", crate::report::format_dataset(&dataset));
    println!("{}", crate::report::format_selection(&selection));
    println!(
        "Equation:\n  {}",
        crate::report::model_equation(&dataset.target, &selection.model)
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let model = crate::io::model_file::read_model_json(&args.model)?;
    println!("{}", crate::report::format_model_file(&model));
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        rows: args.rows,
        seed: args.seed,
        noise_sd: args.noise_sd,
        missing_rate: args.missing_rate,
    };
    let table = generate_sample(&config)?;
    crate::io::export::write_table_csv(&args.output, &table)?;
    info!("Generated {} synthetic samples (seed={}).", table.n_rows(), config.seed);
    println!("wrote {}", args.output.display());
    println!(
        "try: bd fit --input {} --drop Sample_ID,Lat,Lon --id-column Sample_ID",
        args.output.display()
    );
    Ok(())
}

pub fn preprocess_config_from_args(args: &DataArgs) -> PreprocessConfig {
    PreprocessConfig {
        target: args.target.clone(),
        categorical: non_empty(&args.categorical),
        drop_columns: non_empty(&args.drop),
        id_column: args.id_column.clone().filter(|c| !c.trim().is_empty()),
        missing_sentinels: non_empty(&args.sentinel),
        missing_threshold: args.missing_threshold,
    }
}

pub fn pipeline_config_from_args(args: &FitArgs) -> Result<PipelineConfig, AppError> {
    Ok(PipelineConfig {
        input: args.data.input.clone(),
        delimiter: parse_delimiter(&args.data.delimiter)?,
        preprocess: preprocess_config_from_args(&args.data),
        cv: CvConfig {
            folds: args.folds,
            seed: args.seed,
            fold_r2: args.fold_r2,
        },
        export_dir: args.export_dir.clone(),
        export_model: args.export_model.clone(),
    })
}

/// `--categorical ""` (or an empty env var) means "none".
fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
