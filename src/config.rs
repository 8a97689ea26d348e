//! Pipeline configuration

use crate::cleaning::{DAYS_PER_YEAR, EMPLOYMENT_SENTINEL};
use crate::error::{CreditError, Result};
use serde::{Deserialize, Serialize};

/// Settings for a feature-engineering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `DAYS_EMPLOYED` value replaced with missing
    #[serde(default = "default_sentinel")]
    pub employment_sentinel: f64,
    /// Year length used to turn day counts into years
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
    /// Reduce the three history tables concurrently
    #[serde(default = "default_parallel")]
    pub parallel_aggregation: bool,
}

fn default_sentinel() -> f64 {
    EMPLOYMENT_SENTINEL
}

fn default_days_per_year() -> f64 {
    DAYS_PER_YEAR
}

fn default_parallel() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            employment_sentinel: default_sentinel(),
            days_per_year: default_days_per_year(),
            parallel_aggregation: default_parallel(),
        }
    }
}

impl PipelineConfig {
    /// Reject settings that would make derived values meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.days_per_year.is_finite() || self.days_per_year <= 0.0 {
            return Err(CreditError::ConfigError(format!(
                "days_per_year must be positive, got {}",
                self.days_per_year
            )));
        }
        if self.employment_sentinel.is_nan() {
            return Err(CreditError::ConfigError(
                "employment_sentinel must be a number".to_string(),
            ));
        }
        Ok(())
    }
}
