//! rusty-credit CLI - Command-line interface for applicant feature engineering
//!
//! Fits imputation medians on a training table, writes feature tables and
//! replays stored medians on later tables.
//!
//! ## Example Usage
//!
//! ```bash
//! # Fit on the training table and store the medians
//! rusty-credit fit --params params.json
//!
//! # Transform a test table with stored medians
//! rusty-credit transform --params params.json
//!
//! # Fit and transform in one process
//! rusty-credit run
//!
//! # Show configuration
//! rusty-credit info --detailed
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_credit::aggregate::SupplementaryAggregates;
use rusty_credit::applicant::ApplicantTable;
use rusty_credit::config::PipelineConfig;
use rusty_credit::data::{write_features, CsvTableReader};
use rusty_credit::features::{ensure_aligned, FeatureTable};
use rusty_credit::params::{FittedParams, ParameterStore};
use rusty_credit::pipeline::{engineer_features_with_config, FitMode};
use rusty_credit::types::RiskScore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

/// rusty-credit: Leakage-safe feature engineering for loan applicants
#[derive(Parser)]
#[command(name = "rusty-credit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Leakage-safe feature engineering for loan applicants", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit medians on the training table and write its features
    Fit {
        /// Training applicant table (overrides config)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output features CSV
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Where to store fitted medians
        #[arg(short = 'p', long)]
        params: Option<PathBuf>,
    },

    /// Transform a table with previously fitted medians
    Transform {
        /// Applicant table to transform (overrides config)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output features CSV
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Fitted medians to apply
        #[arg(short = 'p', long)]
        params: Option<PathBuf>,
    },

    /// Fit on the training table, then transform the test table
    Run {
        /// Skip writing the fitted medians
        #[arg(long)]
        no_params: bool,
    },

    /// Show configuration information
    Info {
        /// Show detailed information
        #[arg(short = 'd', long)]
        detailed: bool,
    },
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default)]
    files: InputFiles,
    #[serde(default = "default_params_file")]
    params_file: String,
    #[serde(default = "default_delimiter")]
    delimiter: char,
    #[serde(default)]
    pipeline: PipelineConfig,
}

/// Source table file names, relative to the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InputFiles {
    #[serde(default = "default_train_file")]
    train: String,
    #[serde(default = "default_test_file")]
    test: String,
    #[serde(default = "default_bureau_file")]
    bureau: String,
    #[serde(default = "default_previous_file")]
    previous_applications: String,
    #[serde(default = "default_installments_file")]
    installments: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-credit")
        .join("data")
}

fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-credit")
        .join("output")
}

fn default_delimiter() -> char {
    ','
}

fn default_params_file() -> String {
    "fitted_params.json".to_string()
}

fn default_train_file() -> String {
    "application_train.csv".to_string()
}

fn default_test_file() -> String {
    "application_test.csv".to_string()
}

fn default_bureau_file() -> String {
    "bureau.csv".to_string()
}

fn default_previous_file() -> String {
    "previous_application.csv".to_string()
}

fn default_installments_file() -> String {
    "installments_payments.csv".to_string()
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            train: default_train_file(),
            test: default_test_file(),
            bureau: default_bureau_file(),
            previous_applications: default_previous_file(),
            installments: default_installments_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            files: InputFiles::default(),
            params_file: default_params_file(),
            delimiter: default_delimiter(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match dirs::home_dir() {
                Some(home) => home.join(".rusty-credit").join("config.toml"),
                None => return Config::default(),
            },
        };

        if !path.exists() {
            return Config::default();
        }

        match Self::parse(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} Failed to load config: {}", "Warning:".yellow(), e);
                Config::default()
            }
        }
    }

    fn parse(path: &Path) -> rusty_credit::error::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    fn params_path(&self) -> PathBuf {
        self.output_dir.join(&self.params_file)
    }

    fn reader(&self) -> Result<CsvTableReader, Box<dyn std::error::Error>> {
        let delimiter = u8::try_from(self.delimiter)
            .map_err(|_| format!("delimiter '{}' is not a single-byte character", self.delimiter))?;
        Ok(CsvTableReader::with_delimiter(delimiter))
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-credit".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Data dir: {}",
            config.data_dir.display().to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::Fit {
            input,
            output,
            params,
        } => fit_command(&config, input, output, params),
        Commands::Transform {
            input,
            output,
            params,
        } => transform_command(&config, input, output, params),
        Commands::Run { no_params } => run_command(&config, no_params),
        Commands::Info { detailed } => show_info(detailed, &config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn read_applicants(reader: &CsvTableReader, path: &Path) -> anyhow::Result<ApplicantTable> {
    reader
        .read_applicants(path)
        .with_context(|| format!("reading applicant table {}", path.display()))
}

fn build_aggregates(
    config: &Config,
    reader: &CsvTableReader,
) -> anyhow::Result<SupplementaryAggregates> {
    let bureau_path = config.data_file(&config.files.bureau);
    let previous_path = config.data_file(&config.files.previous_applications);
    let installments_path = config.data_file(&config.files.installments);

    let bureau = reader
        .read_bureau(&bureau_path)
        .with_context(|| format!("reading bureau table {}", bureau_path.display()))?;
    let previous = reader
        .read_previous_applications(&previous_path)
        .with_context(|| format!("reading previous applications {}", previous_path.display()))?;
    let installments = reader
        .read_installments(&installments_path)
        .with_context(|| format!("reading installments {}", installments_path.display()))?;

    Ok(SupplementaryAggregates::build(
        &bureau,
        &previous,
        &installments,
        config.pipeline.parallel_aggregation,
    ))
}

fn print_params(params: &FittedParams) {
    println!("{}", "Fitted medians".bold());
    for score in RiskScore::ALL {
        println!("  {} {:.6}", format!("{}:", score).bold(), params.median(score));
    }
}

fn print_summary(label: &str, features: &FeatureTable, output: &Path) {
    println!("{} {}", label.bold(), features.summary());
    println!("  {} {}", "Written to:".bold(), output.display());
}

fn fit_command(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    params: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    config.ensure_dirs()?;
    let start = Instant::now();
    let reader = config.reader()?;

    let pb = spinner("Loading tables...")?;
    let input = input.unwrap_or_else(|| config.data_file(&config.files.train));
    let table = read_applicants(&reader, &input)?;
    let aggregates = build_aggregates(config, &reader)?;

    pb.set_message("Engineering features...");
    let store = ParameterStore::new();
    let features =
        engineer_features_with_config(table, &aggregates, &store, FitMode::Fit, &config.pipeline)?;

    let output = output.unwrap_or_else(|| config.output_dir.join("train_features.csv"));
    let params_path = params.unwrap_or_else(|| config.params_path());
    write_features(&features, &output)?;
    let fitted = store.snapshot()?;
    fitted.save_json(&params_path)?;
    pb.finish_and_clear();

    print_params(&fitted);
    print_summary("Train", &features, &output);
    println!("  {} {}", "Params:".bold(), params_path.display());
    println!(
        "{} Fit finished in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn transform_command(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    params: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    config.ensure_dirs()?;
    let start = Instant::now();
    let reader = config.reader()?;

    let params_path = params.unwrap_or_else(|| config.params_path());
    let fitted = FittedParams::load_json(&params_path)
        .with_context(|| format!("loading fitted medians {}", params_path.display()))?;
    let store = ParameterStore::with_params(fitted);

    let pb = spinner("Loading tables...")?;
    let input = input.unwrap_or_else(|| config.data_file(&config.files.test));
    let table = read_applicants(&reader, &input)?;
    let aggregates = build_aggregates(config, &reader)?;

    pb.set_message("Engineering features...");
    let features =
        engineer_features_with_config(table, &aggregates, &store, FitMode::Apply, &config.pipeline)?;

    let output = output.unwrap_or_else(|| config.output_dir.join("test_features.csv"));
    write_features(&features, &output)?;
    pb.finish_and_clear();

    print_summary("Test", &features, &output);
    println!(
        "{} Transform finished in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_command(config: &Config, no_params: bool) -> Result<(), Box<dyn std::error::Error>> {
    config.ensure_dirs()?;
    let start = Instant::now();
    let reader = config.reader()?;

    let pb = spinner("Loading tables...")?;
    let train = read_applicants(&reader, &config.data_file(&config.files.train))?;
    let test = read_applicants(&reader, &config.data_file(&config.files.test))?;
    let aggregates = build_aggregates(config, &reader)?;

    pb.set_message("Fitting on training table...");
    let store = ParameterStore::new();
    let train_features =
        engineer_features_with_config(train, &aggregates, &store, FitMode::Fit, &config.pipeline)?;

    pb.set_message("Transforming test table...");
    let test_features =
        engineer_features_with_config(test, &aggregates, &store, FitMode::Apply, &config.pipeline)?;
    ensure_aligned(&train_features, &test_features)?;

    let train_output = config.output_dir.join("train_features.csv");
    let test_output = config.output_dir.join("test_features.csv");
    write_features(&train_features, &train_output)?;
    write_features(&test_features, &test_output)?;

    let fitted = store.snapshot()?;
    if !no_params {
        fitted.save_json(&config.params_path())?;
    }
    pb.finish_and_clear();

    print_params(&fitted);
    print_summary("Train", &train_features, &train_output);
    print_summary("Test", &test_features, &test_output);
    println!(
        "  {} {}",
        "Feature columns:".bold(),
        train_features.feature_columns().len()
    );
    println!(
        "{} Run finished in {:.2}s",
        "✓".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn show_info(detailed: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "rusty-credit".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Data directory:".bold(), config.data_dir.display());
    println!("  {} {}", "Output directory:".bold(), config.output_dir.display());
    println!("  {} {}", "Params file:".bold(), config.params_path().display());
    println!("  {} {}", "Train table:".bold(), config.files.train);
    println!("  {} {}", "Test table:".bold(), config.files.test);
    println!();

    println!("{}", "Pipeline".bold());
    println!("{}", "========".dimmed());
    println!(
        "  {} {}",
        "Employment sentinel:".bold(),
        config.pipeline.employment_sentinel
    );
    println!("  {} {}", "Days per year:".bold(), config.pipeline.days_per_year);
    println!(
        "  {} {}",
        "Parallel aggregation:".bold(),
        feature_status(config.pipeline.parallel_aggregation)
    );
    println!();

    if detailed {
        let params_path = config.params_path();
        println!("{}", "Stored parameters".bold());
        println!("{}", "=================".dimmed());
        if params_path.exists() {
            match FittedParams::load_json(&params_path) {
                Ok(params) => print_params(&params),
                Err(e) => println!("  {} {}", "Unreadable:".yellow(), e),
            }
        } else {
            println!("  {}", "none".dimmed());
        }
        println!();

        println!("{}", "Features".bold());
        println!("{}", "========".dimmed());
        println!("  {} {}", "CLI tools:".bold(), feature_status(cfg!(feature = "cli")));
        println!("  {} {}", "Platform:".bold(), std::env::consts::OS);
        println!();
    }

    Ok(())
}

fn feature_status(enabled: bool) -> colored::ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".red()
    }
}
