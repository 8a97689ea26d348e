//! Learned parameters
//!
//! Medians of the three external risk scores are computed once from the
//! training table (`fit`) and replayed unchanged on any later table
//! (`impute`). Nothing learned here ever comes from a held-out table.

use crate::applicant::{ApplicantRecord, ApplicantTable};
use crate::error::{CreditError, Result};
use crate::types::{present, RiskScore};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Frozen statistics learned from a training table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedParams {
    #[serde(rename = "EXT_SOURCE_1")]
    ext_source_1_median: f64,
    #[serde(rename = "EXT_SOURCE_2")]
    ext_source_2_median: f64,
    #[serde(rename = "EXT_SOURCE_3")]
    ext_source_3_median: f64,
}

impl FittedParams {
    /// Build parameters from known medians
    pub fn from_medians(ext_source_1: f64, ext_source_2: f64, ext_source_3: f64) -> Result<Self> {
        let params = Self {
            ext_source_1_median: ext_source_1,
            ext_source_2_median: ext_source_2,
            ext_source_3_median: ext_source_3,
        };
        params.validate()?;
        Ok(params)
    }

    /// Learn medians from a training table
    ///
    /// Fails if any risk-score column has no present value, since an
    /// undefined median means the training sample is unusable.
    pub fn fit(table: &ApplicantTable) -> Result<Self> {
        let mut medians = [0.0; 3];
        for score in RiskScore::ALL {
            medians[score.index()] = median(table.risk_score_values(score)).ok_or_else(|| {
                CreditError::AllMissing {
                    column: score.column().to_string(),
                    rows: table.len(),
                }
            })?;
        }

        let params = Self::from_medians(medians[0], medians[1], medians[2])?;
        log::info!(
            "Fitted medians on {} rows: {}={:.6} {}={:.6} {}={:.6}",
            table.len(),
            RiskScore::ExtSource1,
            params.ext_source_1_median,
            RiskScore::ExtSource2,
            params.ext_source_2_median,
            RiskScore::ExtSource3,
            params.ext_source_3_median
        );
        Ok(params)
    }

    /// Learned median for a risk score
    pub fn median(&self, score: RiskScore) -> f64 {
        match score {
            RiskScore::ExtSource1 => self.ext_source_1_median,
            RiskScore::ExtSource2 => self.ext_source_2_median,
            RiskScore::ExtSource3 => self.ext_source_3_median,
        }
    }

    /// Fill missing risk scores of one record with the learned medians
    ///
    /// Returns which columns were filled, so missingness can still be
    /// reported after the values are overwritten.
    pub fn impute(&self, record: &mut ApplicantRecord) -> ImputedColumns {
        let mut imputed = ImputedColumns::default();
        for score in RiskScore::ALL {
            if present(record.risk_score(score)).is_none() {
                record.set_risk_score(score, Some(self.median(score)));
                imputed.mark(score);
            }
        }
        imputed
    }

    /// Fill missing risk scores across a whole table
    pub fn impute_table(&self, table: ApplicantTable) -> Result<ApplicantTable> {
        let has_target = table.has_target();
        let (columns, _, mut rows) = table.into_parts();
        for row in rows.iter_mut() {
            self.impute(row);
        }
        Ok(ApplicantTable::with_passthrough(columns, rows)?.with_target_column(has_target))
    }

    /// Write parameters as JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read parameters written by [`FittedParams::save_json`]
    pub fn load_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let params: Self = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        for score in RiskScore::ALL {
            let value = self.median(score);
            if !value.is_finite() {
                return Err(CreditError::InvalidParameter {
                    column: score.column().to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Risk-score columns filled by imputation for one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImputedColumns([bool; 3]);

impl ImputedColumns {
    pub fn mark(&mut self, score: RiskScore) {
        self.0[score.index()] = true;
    }

    pub fn contains(&self, score: RiskScore) -> bool {
        self.0[score.index()]
    }

    /// Number of filled columns
    pub fn count(&self) -> usize {
        self.0.iter().filter(|v| **v).count()
    }
}

/// Parameter store shared by fit and apply calls
///
/// Starts unset. A fit replaces the whole parameter set in a single write;
/// readers take a snapshot and never see a partially written fit.
#[derive(Debug, Default)]
pub struct ParameterStore {
    current: RwLock<Option<Arc<FittedParams>>>,
}

impl ParameterStore {
    /// Create an unset store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding parameters, e.g. loaded from disk
    pub fn with_params(params: FittedParams) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(params))),
        }
    }

    /// Fit on a training table and replace the stored parameters
    pub fn fit(&self, table: &ApplicantTable) -> Result<Arc<FittedParams>> {
        let params = Arc::new(FittedParams::fit(table)?);
        self.replace(Arc::clone(&params));
        Ok(params)
    }

    /// Atomically replace the stored parameters
    pub fn replace(&self, params: Arc<FittedParams>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            log::debug!("Overwriting previously fitted parameters");
        }
        *guard = Some(params);
    }

    /// Current parameters, failing if nothing has been fitted yet
    pub fn snapshot(&self) -> Result<Arc<FittedParams>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| {
                CreditError::NotFitted(
                    "apply requested before any fit; fit on the training table first".to_string(),
                )
            })
    }

    /// Check if parameters are present
    pub fn is_fitted(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Median of present values; the mean of the two middle values for even counts
pub fn median(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present_values: Vec<f64> = values.filter_map(present).collect();
    if present_values.is_empty() {
        return None;
    }
    Some(Data::new(present_values).median())
}
