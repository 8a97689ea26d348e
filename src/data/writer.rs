//! CSV output of feature tables

use crate::error::Result;
use crate::features::FeatureTable;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a feature table to a file
///
/// Missing values are written as empty cells and flags as 0/1.
pub fn write_features(table: &FeatureTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_features_to(table, file)?;
    log::info!("Wrote {} feature rows to {}", table.len(), path.display());
    Ok(())
}

/// Write a feature table to any writer
pub fn write_features_to<W: Write>(table: &FeatureTable, sink: W) -> Result<()> {
    let mut writer = Writer::from_writer(sink);

    let header: Vec<String> = table.columns().into_iter().map(|(name, _)| name).collect();
    writer.write_record(&header)?;

    for row in table.rows() {
        let cells: Vec<String> = table.row_cells(row).iter().map(|c| c.to_string()).collect();
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}
