//! Anomaly correction for employment durations

use crate::types::{present, Days};

/// `DAYS_EMPLOYED` value meaning "not applicable" (retired, unemployed)
pub const EMPLOYMENT_SENTINEL: Days = 365_243.0;

/// Replace the sentinel with a missing value
pub fn correct_employment(days_employed: Option<Days>, sentinel: Days) -> Option<Days> {
    present(days_employed).filter(|d| *d != sentinel)
}
