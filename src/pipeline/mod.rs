//! Feature pipeline: ordered stages and the `engineer_features` entry point

pub mod engine;
pub mod stage;

pub use engine::{engineer_features, engineer_features_with_config, FitMode, Pipeline};
pub use stage::{
    AgeBinning, AggregateJoin, AnomalyCorrection, DemographicDerivation, FinancialRatioStage,
    Imputation, MissingnessIndicators, Stage,
};
