//! Command-line parsing for the bulk-density regression tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the preprocessing/selection code. Every data option can also be
//! set through an environment variable (a `.env` file is loaded at start-up).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_FOLDS, DEFAULT_MISSING_THRESHOLD, DEFAULT_SEED, DEFAULT_SENTINEL, FoldR2};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bd",
    version,
    about = "Soil bulk density prediction (AICc stepwise OLS + k-fold CV)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Preprocess, select features, cross-validate and print/export the results.
    Fit(FitArgs),
    /// Preprocess and run stepwise selection only; prints the equation and trace.
    Select(DataArgs),
    /// Print a previously exported model JSON.
    Show(ShowArgs),
    /// Write a seeded synthetic soil survey CSV to try the tool on.
    Demo(DemoArgs),
}

/// Input and preprocessing options shared by `fit` and `select`.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Input CSV file.
    #[arg(short = 'i', long, env = "BD_INPUT", value_name = "CSV")]
    pub input: PathBuf,

    /// Target column to predict.
    #[arg(short = 't', long, env = "BD_TARGET", default_value = "BD")]
    pub target: String,

    /// Categorical columns to one-hot encode (comma separated).
    #[arg(long, env = "BD_CATEGORICAL", value_delimiter = ',', default_value = "Soil_Order")]
    pub categorical: Vec<String>,

    /// Columns excluded from modeling, e.g. identifiers and coordinates (comma separated).
    #[arg(long, env = "BD_DROP", value_delimiter = ',')]
    pub drop: Vec<String>,

    /// Column used to label samples in the predictions export.
    #[arg(long, env = "BD_ID_COLUMN")]
    pub id_column: Option<String>,

    /// Cell values treated as missing, in addition to empty cells (comma separated).
    #[arg(long, env = "BD_SENTINEL", value_delimiter = ',', default_value = DEFAULT_SENTINEL)]
    pub sentinel: Vec<String>,

    /// Drop numeric columns whose missing fraction exceeds this value.
    #[arg(long, env = "BD_MISSING_THRESHOLD", default_value_t = DEFAULT_MISSING_THRESHOLD)]
    pub missing_threshold: f64,

    /// Field delimiter: a single character or `tab`.
    #[arg(long, env = "BD_DELIMITER", default_value = ",")]
    pub delimiter: String,
}

/// Options for the full pipeline.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of cross-validation folds.
    #[arg(short = 'k', long, env = "BD_FOLDS", default_value_t = DEFAULT_FOLDS)]
    pub folds: usize,

    /// Seed for the fold shuffle.
    #[arg(long, env = "BD_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Which R² to record per fold.
    #[arg(long, value_enum, env = "BD_FOLD_R2", default_value_t = FoldR2::Train)]
    pub fold_r2: FoldR2,

    /// Write fold metrics, predictions, equation and coefficient tables into this directory.
    #[arg(long, env = "BD_EXPORT_DIR", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Export the fitted model (coefficients + selection trace + CV summary) to JSON.
    #[arg(long = "export-model", env = "BD_EXPORT_MODEL", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

/// Options for printing a saved model.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Model JSON file produced by `bd fit --export-model`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,
}

/// Options for the synthetic survey generator.
#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Where to write the CSV.
    #[arg(short = 'o', long, default_value = "soil_sample.csv")]
    pub output: PathBuf,

    /// Number of samples to generate.
    #[arg(short = 'n', long, default_value_t = 150)]
    pub rows: usize,

    /// Random seed for the generator.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Standard deviation of the noise added to bulk density (g/cm³).
    #[arg(long, default_value_t = 0.03)]
    pub noise_sd: f64,

    /// Probability that a covariate cell is written as missing.
    #[arg(long, default_value_t = 0.03)]
    pub missing_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults() {
        let cli = Cli::try_parse_from(["bd", "fit", "--input", "soil.csv"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.data.target, "BD");
        assert_eq!(args.data.categorical, vec!["Soil_Order"]);
        assert_eq!(args.data.sentinel, vec!["-"]);
        assert_eq!(args.folds, 10);
        assert_eq!(args.seed, 42);
        assert_eq!(args.fold_r2, FoldR2::Train);
        assert!(args.export_dir.is_none());
    }

    #[test]
    fn list_options_split_on_commas() {
        let cli = Cli::try_parse_from([
            "bd",
            "select",
            "--input",
            "soil.csv",
            "--drop",
            "Sample_ID,Lat,Lon",
            "--categorical",
            "Soil_Order,Horizon",
        ])
        .unwrap();
        let Command::Select(args) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.drop, vec!["Sample_ID", "Lat", "Lon"]);
        assert_eq!(args.categorical, vec!["Soil_Order", "Horizon"]);
    }

    #[test]
    fn fold_r2_accepts_holdout() {
        let cli = Cli::try_parse_from(["bd", "fit", "-i", "soil.csv", "--fold-r2", "holdout", "-k", "5"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.fold_r2, FoldR2::Holdout);
        assert_eq!(args.folds, 5);
    }
}
