//! Pipeline execution engine

use super::stage::{
    AgeBinning, AggregateJoin, AnomalyCorrection, DemographicDerivation, FinancialRatioStage,
    Imputation, MissingnessIndicators, Stage,
};
use crate::aggregate::SupplementaryAggregates;
use crate::applicant::ApplicantTable;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::FeatureTable;
use crate::params::{FittedParams, ParameterStore};
use std::sync::Arc;
use std::time::Instant;

/// Whether a run learns parameters or replays stored ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Fit on this table first, replacing stored parameters
    Fit,
    /// Use stored parameters; fails if none are stored
    Apply,
}

impl From<bool> for FitMode {
    fn from(fit: bool) -> Self {
        if fit {
            FitMode::Fit
        } else {
            FitMode::Apply
        }
    }
}

/// Ordered list of stages
pub struct Pipeline<'a> {
    stages: Vec<Box<dyn Stage + 'a>>,
}

impl<'a> Pipeline<'a> {
    /// Create new empty pipeline
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The standard feature pipeline
    ///
    /// Anomaly correction runs before demographics so the sentinel never
    /// reaches the year conversion. Missingness indicators run after
    /// imputation but read the per-row record of what imputation filled.
    pub fn standard(
        params: Arc<FittedParams>,
        aggregates: &'a SupplementaryAggregates,
        config: &PipelineConfig,
    ) -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add_stage(Box::new(AnomalyCorrection::new(config.employment_sentinel)))
            .add_stage(Box::new(DemographicDerivation::new(config.days_per_year)))
            .add_stage(Box::new(Imputation::new(params)))
            .add_stage(Box::new(MissingnessIndicators))
            .add_stage(Box::new(FinancialRatioStage))
            .add_stage(Box::new(AgeBinning))
            .add_stage(Box::new(AggregateJoin::new(aggregates)));
        pipeline
    }

    /// Append a stage
    pub fn add_stage(&mut self, stage: Box<dyn Stage + 'a>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run every stage in order
    pub fn run(&self, table: FeatureTable) -> Result<FeatureTable> {
        let rows = table.len();
        let mut table = table;
        for stage in &self.stages {
            let started = Instant::now();
            table = stage.run(table)?;
            debug_assert_eq!(table.len(), rows, "stage {} changed row count", stage.name());
            log::debug!(
                "Stage {} finished in {:?}",
                stage.name(),
                started.elapsed()
            );
        }
        Ok(table)
    }
}

impl Default for Pipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn an applicant table into a feature table with default settings
///
/// With [`FitMode::Fit`] the medians are learned from `table` and replace
/// whatever `store` held. With [`FitMode::Apply`] the stored medians are
/// used and an unset store is an error.
pub fn engineer_features(
    table: ApplicantTable,
    aggregates: &SupplementaryAggregates,
    store: &ParameterStore,
    mode: FitMode,
) -> Result<FeatureTable> {
    engineer_features_with_config(table, aggregates, store, mode, &PipelineConfig::default())
}

/// [`engineer_features`] with explicit settings
pub fn engineer_features_with_config(
    table: ApplicantTable,
    aggregates: &SupplementaryAggregates,
    store: &ParameterStore,
    mode: FitMode,
    config: &PipelineConfig,
) -> Result<FeatureTable> {
    config.validate()?;

    let params = match mode {
        FitMode::Fit => store.fit(&table)?,
        FitMode::Apply => store.snapshot()?,
    };

    let started = Instant::now();
    let rows = table.len();
    let pipeline = Pipeline::standard(params, aggregates, config);
    let features = pipeline.run(FeatureTable::from_applicants(table))?;

    log::info!(
        "Engineered features for {} applicants ({:?}, {} stages) in {:?}",
        rows,
        mode,
        pipeline.stage_count(),
        started.elapsed()
    );
    Ok(features)
}
