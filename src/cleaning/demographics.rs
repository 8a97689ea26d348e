//! Day counts to years

use crate::types::{present, Days};

/// Average year length used for day-count conversion
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Convert a negative day count into a positive number of years
///
/// Missing input gives missing output.
pub fn days_to_years(days: Option<Days>, days_per_year: f64) -> Option<f64> {
    present(days).map(|d| -d / days_per_year)
}
