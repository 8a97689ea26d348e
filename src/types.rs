//! Core types and column names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Applicant key (`SK_ID_CURR`)
pub type ApplicantId = i64;

/// Day count relative to the application date (negative = in the past)
pub type Days = f64;

/// Monetary amount
pub type Amount = f64;

/// Rate in the range 0.0 to 1.0
pub type Rate = f64;

/// Source column names
pub mod columns {
    pub const SK_ID_CURR: &str = "SK_ID_CURR";
    pub const TARGET: &str = "TARGET";
    pub const DAYS_BIRTH: &str = "DAYS_BIRTH";
    pub const DAYS_EMPLOYED: &str = "DAYS_EMPLOYED";
    pub const EXT_SOURCE_1: &str = "EXT_SOURCE_1";
    pub const EXT_SOURCE_2: &str = "EXT_SOURCE_2";
    pub const EXT_SOURCE_3: &str = "EXT_SOURCE_3";
    pub const AMT_INCOME_TOTAL: &str = "AMT_INCOME_TOTAL";
    pub const AMT_CREDIT: &str = "AMT_CREDIT";
    pub const AMT_ANNUITY: &str = "AMT_ANNUITY";
    pub const AMT_GOODS_PRICE: &str = "AMT_GOODS_PRICE";

    pub const CREDIT_ACTIVE: &str = "CREDIT_ACTIVE";
    pub const AMT_CREDIT_SUM_OVERDUE: &str = "AMT_CREDIT_SUM_OVERDUE";
    pub const AMT_CREDIT_SUM_DEBT: &str = "AMT_CREDIT_SUM_DEBT";
    pub const AMT_CREDIT_SUM: &str = "AMT_CREDIT_SUM";

    pub const NAME_CONTRACT_STATUS: &str = "NAME_CONTRACT_STATUS";

    pub const DAYS_INSTALMENT: &str = "DAYS_INSTALMENT";
    pub const DAYS_ENTRY_PAYMENT: &str = "DAYS_ENTRY_PAYMENT";

    /// Applicant columns that are parsed into typed fields
    pub const APPLICANT_TYPED: [&str; 11] = [
        SK_ID_CURR,
        TARGET,
        DAYS_BIRTH,
        DAYS_EMPLOYED,
        EXT_SOURCE_1,
        EXT_SOURCE_2,
        EXT_SOURCE_3,
        AMT_INCOME_TOTAL,
        AMT_CREDIT,
        AMT_ANNUITY,
        AMT_GOODS_PRICE,
    ];
}

/// The three external risk-score columns whose medians are learned at fit time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskScore {
    #[serde(rename = "EXT_SOURCE_1")]
    ExtSource1,
    #[serde(rename = "EXT_SOURCE_2")]
    ExtSource2,
    #[serde(rename = "EXT_SOURCE_3")]
    ExtSource3,
}

impl RiskScore {
    /// All risk-score columns in output order
    pub const ALL: [RiskScore; 3] = [
        RiskScore::ExtSource1,
        RiskScore::ExtSource2,
        RiskScore::ExtSource3,
    ];

    /// Source column name
    pub fn column(&self) -> &'static str {
        match self {
            RiskScore::ExtSource1 => columns::EXT_SOURCE_1,
            RiskScore::ExtSource2 => columns::EXT_SOURCE_2,
            RiskScore::ExtSource3 => columns::EXT_SOURCE_3,
        }
    }

    /// Name of the missingness indicator column
    pub fn missing_flag_column(&self) -> &'static str {
        match self {
            RiskScore::ExtSource1 => "EXT_SOURCE_1_MISSING",
            RiskScore::ExtSource2 => "EXT_SOURCE_2_MISSING",
            RiskScore::ExtSource3 => "EXT_SOURCE_3_MISSING",
        }
    }

    /// Position in fixed-size per-score arrays
    pub fn index(&self) -> usize {
        match self {
            RiskScore::ExtSource1 => 0,
            RiskScore::ExtSource2 => 1,
            RiskScore::ExtSource3 => 2,
        }
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Treats NaN the same as an absent value
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
