//! Applicant records and the applicant table

use crate::error::{CreditError, Result};
use crate::features::is_reserved_column;
use crate::types::{Amount, ApplicantId, Days, RiskScore};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// One loan applicant
///
/// Typed fields cover every column the pipeline reads. Any other source
/// column is carried through unchanged in `passthrough`, aligned with
/// [`ApplicantTable::passthrough_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    /// Training label, absent in held-out tables
    pub target: Option<i32>,
    pub days_birth: Option<Days>,
    pub days_employed: Option<Days>,
    pub ext_source_1: Option<f64>,
    pub ext_source_2: Option<f64>,
    pub ext_source_3: Option<f64>,
    pub amt_income_total: Option<Amount>,
    pub amt_credit: Option<Amount>,
    pub amt_annuity: Option<Amount>,
    pub amt_goods_price: Option<Amount>,
    #[serde(default)]
    pub passthrough: Vec<Option<String>>,
}

impl ApplicantRecord {
    /// Create a record with every optional field missing
    pub fn new(id: ApplicantId) -> Self {
        Self {
            id,
            target: None,
            days_birth: None,
            days_employed: None,
            ext_source_1: None,
            ext_source_2: None,
            ext_source_3: None,
            amt_income_total: None,
            amt_credit: None,
            amt_annuity: None,
            amt_goods_price: None,
            passthrough: Vec::new(),
        }
    }

    /// Get a risk-score value
    pub fn risk_score(&self, score: RiskScore) -> Option<f64> {
        match score {
            RiskScore::ExtSource1 => self.ext_source_1,
            RiskScore::ExtSource2 => self.ext_source_2,
            RiskScore::ExtSource3 => self.ext_source_3,
        }
    }

    /// Overwrite a risk-score value
    pub fn set_risk_score(&mut self, score: RiskScore, value: Option<f64>) {
        match score {
            RiskScore::ExtSource1 => self.ext_source_1 = value,
            RiskScore::ExtSource2 => self.ext_source_2 = value,
            RiskScore::ExtSource3 => self.ext_source_3 = value,
        }
    }
}

/// Applicant table with unique keys
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantTable {
    passthrough_columns: Vec<String>,
    has_target: bool,
    rows: Vec<ApplicantRecord>,
}

impl ApplicantTable {
    /// Build a table from records that carry no pass-through columns
    pub fn new(rows: Vec<ApplicantRecord>) -> Result<Self> {
        Self::with_passthrough(Vec::new(), rows)
    }

    /// Build a table, checking key uniqueness and pass-through alignment
    ///
    /// Pass-through names must be unique and must not match a typed or
    /// derived column, so every output column name appears once.
    pub fn with_passthrough(
        passthrough_columns: Vec<String>,
        rows: Vec<ApplicantRecord>,
    ) -> Result<Self> {
        let mut names = HashSet::with_capacity(passthrough_columns.len());
        for name in &passthrough_columns {
            if is_reserved_column(name) || !names.insert(name.to_ascii_uppercase()) {
                return Err(CreditError::DataError(format!(
                    "Pass-through column '{}' clashes with another output column",
                    name
                )));
            }
        }

        let mut seen = HashSet::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if !seen.insert(row.id) {
                return Err(CreditError::DuplicateApplicant(row.id));
            }
            if row.passthrough.len() != passthrough_columns.len() {
                return Err(CreditError::DataError(format!(
                    "Row {} (applicant {}) has {} pass-through values, expected {}",
                    idx,
                    row.id,
                    row.passthrough.len(),
                    passthrough_columns.len()
                )));
            }
        }

        let has_target = rows.iter().any(|r| r.target.is_some());

        Ok(Self {
            passthrough_columns,
            has_target,
            rows,
        })
    }

    /// Mark the table as carrying a `TARGET` column even if every label is missing
    pub fn with_target_column(mut self, has_target: bool) -> Self {
        self.has_target = has_target || self.rows.iter().any(|r| r.target.is_some());
        self
    }

    /// Extra source columns, in source order
    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    /// Whether the table carries the training label
    pub fn has_target(&self) -> bool {
        self.has_target
    }

    /// Get all rows
    pub fn rows(&self) -> &[ApplicantRecord] {
        &self.rows
    }

    /// Consume the table into its parts
    pub fn into_parts(self) -> (Vec<String>, bool, Vec<ApplicantRecord>) {
        (self.passthrough_columns, self.has_target, self.rows)
    }

    /// Number of applicants
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no applicants
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one risk-score column
    pub fn risk_score_values(&self, score: RiskScore) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |r| r.risk_score(score))
    }
}
