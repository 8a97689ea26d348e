//! Row-level cleaners
//!
//! Pure per-row functions with no cross-row state. The pipeline wraps each
//! of them in a stage.

pub mod anomaly;
pub mod binning;
pub mod demographics;
pub mod missing;
pub mod ratios;

pub use anomaly::{correct_employment, EMPLOYMENT_SENTINEL};
pub use binning::AgeBin;
pub use demographics::{days_to_years, DAYS_PER_YEAR};
pub use missing::MissingFlags;
pub use ratios::{ratio, FinancialRatios};
