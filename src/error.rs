//! Error types for rusty_credit

use thiserror::Error;

/// Main error type for rusty_credit
#[derive(Error, Debug)]
pub enum CreditError {
    #[error("Parameters not fitted: {0}")]
    NotFitted(String),

    #[error("Median undefined for {column}: all {rows} values are missing")]
    AllMissing { column: String, rows: usize },

    #[error("Invalid parameter for {column}: {value}")]
    InvalidParameter { column: String, value: f64 },

    #[error("Column '{0}' not found")]
    MissingColumn(String),

    #[error("Duplicate applicant key: {0}")]
    DuplicateApplicant(i64),

    #[error("Parse error at row {row}, column '{column}': cannot read '{value}'")]
    ParseError {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Feature columns differ between tables: {0}")]
    ColumnMismatch(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("DataFrame error: {0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    #[cfg(feature = "cli")]
    #[error("Config file error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for rusty_credit operations
pub type Result<T> = std::result::Result<T, CreditError>;
