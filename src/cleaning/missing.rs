//! Missingness indicators

use crate::applicant::ApplicantRecord;
use crate::params::ImputedColumns;
use crate::types::{present, RiskScore};

pub const EMPLOYMENT_MISSING: &str = "EMPLOYMENT_MISSING";

/// Whether each source value was missing before imputation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingFlags {
    pub ext_source: [bool; 3],
    pub employment: bool,
}

impl MissingFlags {
    /// Flags for one row
    ///
    /// A risk score counts as missing if imputation filled it or if it is
    /// still missing now, which is the same test imputation uses. The
    /// employment flag reads the anomaly-corrected value.
    pub fn from_record(record: &ApplicantRecord, imputed: &ImputedColumns) -> Self {
        let mut ext_source = [false; 3];
        for score in RiskScore::ALL {
            ext_source[score.index()] =
                imputed.contains(score) || present(record.risk_score(score)).is_none();
        }
        Self {
            ext_source,
            employment: present(record.days_employed).is_none(),
        }
    }

    pub fn risk_score(&self, score: RiskScore) -> bool {
        self.ext_source[score.index()]
    }
}
