//! # Rusty-Credit
//!
//! Leakage-safe feature engineering for loan applicant tables.
//!
//! Risk-score medians are learned on a training table, stored in a
//! [`ParameterStore`](params::ParameterStore) and replayed on any later
//! table, so test rows never influence the learned values. Around that sit
//! row cleaners, financial ratios, age bins and three per-applicant
//! history aggregates joined onto the result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_credit::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> rusty_credit::error::Result<()> {
//! let reader = CsvTableReader::new();
//! let train = reader.read_applicants(Path::new("application_train.csv"))?;
//! let test = reader.read_applicants(Path::new("application_test.csv"))?;
//! let aggregates = SupplementaryAggregates::build(
//!     &reader.read_bureau(Path::new("bureau.csv"))?,
//!     &reader.read_previous_applications(Path::new("previous_application.csv"))?,
//!     &reader.read_installments(Path::new("installments_payments.csv"))?,
//!     true,
//! );
//!
//! let store = ParameterStore::new();
//! let train_features = engineer_features(train, &aggregates, &store, FitMode::Fit)?;
//! let test_features = engineer_features(test, &aggregates, &store, FitMode::Apply)?;
//! ensure_aligned(&train_features, &test_features)?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod applicant;
pub mod cleaning;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod history;
pub mod params;
pub mod pipeline;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::aggregate::{AggregateTable, SupplementaryAggregates};
    pub use crate::applicant::{ApplicantRecord, ApplicantTable};
    pub use crate::config::PipelineConfig;
    pub use crate::data::{write_features, CsvTableReader};
    pub use crate::error::{CreditError, Result};
    pub use crate::features::{ensure_aligned, Cell, FeatureRow, FeatureTable};
    pub use crate::history::{BureauRecord, InstallmentRecord, PreviousApplicationRecord};
    pub use crate::params::{FittedParams, ParameterStore};
    pub use crate::pipeline::{engineer_features, engineer_features_with_config, FitMode};
    pub use crate::types::*;
}
