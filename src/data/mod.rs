//! Loading source tables and writing feature tables
//!
//! These sit around the pipeline; the pipeline itself only sees typed
//! tables.

pub mod loader;
pub mod writer;

pub use loader::CsvTableReader;
pub use writer::{write_features, write_features_to};
