//! Pipeline stages
//!
//! Each stage takes the feature table by value and returns the updated
//! table. Stages never add or drop rows.

use crate::aggregate::SupplementaryAggregates;
use crate::cleaning::{correct_employment, days_to_years, AgeBin, FinancialRatios, MissingFlags};
use crate::error::Result;
use crate::features::FeatureTable;
use crate::params::FittedParams;
use hashbrown::HashSet;
use std::sync::Arc;

/// One step of the feature pipeline
pub trait Stage: Send + Sync {
    /// Transform the whole table
    fn run(&self, table: FeatureTable) -> Result<FeatureTable>;

    /// Stage name used in logs
    fn name(&self) -> &str;
}

/// Replace the `DAYS_EMPLOYED` sentinel with missing
#[derive(Debug, Clone)]
pub struct AnomalyCorrection {
    sentinel: f64,
}

impl AnomalyCorrection {
    pub fn new(sentinel: f64) -> Self {
        Self { sentinel }
    }
}

impl Stage for AnomalyCorrection {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        let mut corrected = 0usize;
        let table = table.map_rows(|row| {
            let before = row.applicant.days_employed;
            row.applicant.days_employed = correct_employment(before, self.sentinel);
            if before == Some(self.sentinel) {
                corrected += 1;
            }
        });
        log::debug!("{}: {} sentinel values replaced", self.name(), corrected);
        Ok(table)
    }

    fn name(&self) -> &str {
        "anomaly_correction"
    }
}

/// Derive `AGE_YEARS` and `EMPLOYMENT_YEARS`
#[derive(Debug, Clone)]
pub struct DemographicDerivation {
    days_per_year: f64,
}

impl DemographicDerivation {
    pub fn new(days_per_year: f64) -> Self {
        Self { days_per_year }
    }
}

impl Stage for DemographicDerivation {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        Ok(table.map_rows(|row| {
            row.age_years = days_to_years(row.applicant.days_birth, self.days_per_year);
            row.employment_years = days_to_years(row.applicant.days_employed, self.days_per_year);
        }))
    }

    fn name(&self) -> &str {
        "demographic_derivation"
    }
}

/// Fill missing risk scores from fitted medians
#[derive(Debug, Clone)]
pub struct Imputation {
    params: Arc<FittedParams>,
}

impl Imputation {
    pub fn new(params: Arc<FittedParams>) -> Self {
        Self { params }
    }
}

impl Stage for Imputation {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        let mut filled = 0usize;
        let table = table.map_rows(|row| {
            let imputed = self.params.impute(&mut row.applicant);
            filled += imputed.count();
            row.imputed = imputed;
        });
        log::debug!("{}: {} values filled", self.name(), filled);
        Ok(table)
    }

    fn name(&self) -> &str {
        "imputation"
    }
}

/// Emit `*_MISSING` flags from pre-imputation state
#[derive(Debug, Clone, Default)]
pub struct MissingnessIndicators;

impl Stage for MissingnessIndicators {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        Ok(table.map_rows(|row| {
            row.missing_flags = Some(MissingFlags::from_record(&row.applicant, &row.imputed));
        }))
    }

    fn name(&self) -> &str {
        "missingness_indicators"
    }
}

/// Compute credit/income, annuity/income and credit/goods ratios
#[derive(Debug, Clone, Default)]
pub struct FinancialRatioStage;

impl Stage for FinancialRatioStage {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        Ok(table.map_rows(|row| {
            row.ratios = FinancialRatios::from_record(&row.applicant);
        }))
    }

    fn name(&self) -> &str {
        "financial_ratios"
    }
}

/// Bin `AGE_YEARS` into `AGE_GROUP`
#[derive(Debug, Clone, Default)]
pub struct AgeBinning;

impl Stage for AgeBinning {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        let mut unbinned = 0usize;
        let table = table.map_rows(|row| {
            row.age_group = AgeBin::from_age(row.age_years);
            if row.age_group.is_none() {
                unbinned += 1;
            }
        });
        if unbinned > 0 {
            log::warn!("{}: {} rows have no age group", self.name(), unbinned);
        }
        Ok(table)
    }

    fn name(&self) -> &str {
        "age_binning"
    }
}

/// Left join of the three aggregate tables on applicant key
#[derive(Debug, Clone)]
pub struct AggregateJoin<'a> {
    aggregates: &'a SupplementaryAggregates,
}

impl<'a> AggregateJoin<'a> {
    pub fn new(aggregates: &'a SupplementaryAggregates) -> Self {
        Self { aggregates }
    }
}

impl Stage for AggregateJoin<'_> {
    fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        let aggregates = self.aggregates;
        let table = table.map_rows(|row| {
            let id = row.applicant.id;
            row.bureau = aggregates.bureau.get(id).cloned();
            row.previous = aggregates.previous.get(id).cloned();
            row.installments = aggregates.installments.get(id).cloned();
        });

        let ids: HashSet<i64> = table.rows().iter().map(|r| r.applicant.id).collect();
        let unmatched = aggregates
            .bureau
            .keys()
            .chain(aggregates.previous.keys())
            .chain(aggregates.installments.keys())
            .filter(|id| !ids.contains(id))
            .count();
        if unmatched > 0 {
            log::warn!(
                "{}: {} aggregate rows have no applicant in this table",
                self.name(),
                unmatched
            );
        }
        Ok(table)
    }

    fn name(&self) -> &str {
        "aggregate_join"
    }
}
