//! Feature table produced by the pipeline
//!
//! A [`FeatureTable`] starts as a copy of the applicant table and is filled
//! in stage by stage. Every row keeps its applicant record, so the output
//! always has the same applicants, in the same order, as the input.

use crate::aggregate::{
    Aggregate, BureauAggregate, InstallmentAggregate, PreviousApplicationAggregate,
    SupplementaryAggregates,
};
use crate::applicant::{ApplicantRecord, ApplicantTable};
use crate::cleaning::binning::AgeBin;
use crate::cleaning::missing::{MissingFlags, EMPLOYMENT_MISSING};
use crate::cleaning::ratios::FinancialRatios;
use crate::error::{CreditError, Result};
use crate::params::ImputedColumns;
use crate::types::{columns, RiskScore};
use polars::prelude::{DataFrame, NamedFrom, Series};
use std::fmt;

pub const AGE_YEARS: &str = "AGE_YEARS";
pub const EMPLOYMENT_YEARS: &str = "EMPLOYMENT_YEARS";
pub const AGE_GROUP: &str = "AGE_GROUP";

/// Storage kind of an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

/// One output value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Cell::Float(v),
            _ => Cell::Missing,
        }
    }
}

impl From<Option<i32>> for Cell {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Cell::Missing, |v| Cell::Int(v as i64))
    }
}

impl From<bool> for Cell {
    fn from(flag: bool) -> Self {
        Cell::Int(flag as i64)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(v) => f.write_str(v),
            Cell::Missing => Ok(()),
        }
    }
}

/// Applicant row with every derived and joined field
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub applicant: ApplicantRecord,
    pub age_years: Option<f64>,
    pub employment_years: Option<f64>,
    /// Risk scores filled by imputation
    pub imputed: ImputedColumns,
    pub missing_flags: Option<MissingFlags>,
    pub ratios: FinancialRatios,
    pub age_group: Option<AgeBin>,
    pub bureau: Option<BureauAggregate>,
    pub previous: Option<PreviousApplicationAggregate>,
    pub installments: Option<InstallmentAggregate>,
}

impl FeatureRow {
    pub fn new(applicant: ApplicantRecord) -> Self {
        Self {
            applicant,
            age_years: None,
            employment_years: None,
            imputed: ImputedColumns::default(),
            missing_flags: None,
            ratios: FinancialRatios::default(),
            age_group: None,
            bureau: None,
            previous: None,
            installments: None,
        }
    }
}

/// Table of feature rows, one per applicant
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    passthrough_columns: Vec<String>,
    has_target: bool,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Start a feature table from raw applicants
    pub fn from_applicants(table: ApplicantTable) -> Self {
        let (passthrough_columns, has_target, rows) = table.into_parts();
        Self {
            passthrough_columns,
            has_target,
            rows: rows.into_iter().map(FeatureRow::new).collect(),
        }
    }

    /// Apply a per-row update to every row
    pub fn map_rows<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(&mut FeatureRow),
    {
        for row in self.rows.iter_mut() {
            f(row);
        }
        self
    }

    /// Get all rows
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Find the row of an applicant
    pub fn row(&self, id: i64) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.applicant.id == id)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the training label is part of the output
    pub fn has_target(&self) -> bool {
        self.has_target
    }

    /// All output columns, including the key and the label
    pub fn columns(&self) -> Vec<(String, ColumnKind)> {
        let mut cols = vec![(columns::SK_ID_CURR.to_string(), ColumnKind::Int)];
        if self.has_target {
            cols.push((columns::TARGET.to_string(), ColumnKind::Int));
        }
        cols.extend(self.feature_columns());
        cols
    }

    /// Model input columns: everything except the key and the label
    ///
    /// Identical for a training table and its held-out counterpart.
    pub fn feature_columns(&self) -> Vec<(String, ColumnKind)> {
        let mut cols: Vec<(String, ColumnKind)> = columns::APPLICANT_TYPED
            .iter()
            .filter(|c| **c != columns::SK_ID_CURR && **c != columns::TARGET)
            .map(|c| (c.to_string(), ColumnKind::Float))
            .collect();

        cols.extend(
            self.passthrough_columns
                .iter()
                .map(|c| (c.clone(), ColumnKind::Text)),
        );

        cols.extend(
            derived_columns()
                .into_iter()
                .map(|(name, kind)| (name.to_string(), kind)),
        );
        cols
    }

    /// Values of one row, aligned with [`FeatureTable::columns`]
    pub fn row_cells(&self, row: &FeatureRow) -> Vec<Cell> {
        let a = &row.applicant;
        let mut cells = vec![Cell::Int(a.id)];
        if self.has_target {
            cells.push(Cell::from(a.target));
        }

        cells.extend(
            [
                a.days_birth,
                a.days_employed,
                a.ext_source_1,
                a.ext_source_2,
                a.ext_source_3,
                a.amt_income_total,
                a.amt_credit,
                a.amt_annuity,
                a.amt_goods_price,
            ]
            .into_iter()
            .map(Cell::from),
        );

        cells.extend(
            a.passthrough
                .iter()
                .map(|v| v.clone().map_or(Cell::Missing, Cell::Text)),
        );

        cells.push(Cell::from(row.age_years));
        cells.push(Cell::from(row.employment_years));
        match &row.missing_flags {
            Some(flags) => {
                for score in RiskScore::ALL {
                    cells.push(Cell::from(flags.risk_score(score)));
                }
                cells.push(Cell::from(flags.employment));
            }
            None => cells.extend(std::iter::repeat(Cell::Missing).take(RiskScore::ALL.len() + 1)),
        }
        cells.extend(row.ratios.values().into_iter().map(Cell::from));
        cells.push(
            row.age_group
                .map_or(Cell::Missing, |bin| Cell::Text(bin.label().to_string())),
        );

        cells.extend(aggregate_cells(row.bureau.as_ref()));
        cells.extend(aggregate_cells(row.previous.as_ref()));
        cells.extend(aggregate_cells(row.installments.as_ref()));
        cells
    }

    /// Hand the table over to polars for downstream modelling
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self.columns();
        let rows: Vec<Vec<Cell>> = self.rows.iter().map(|r| self.row_cells(r)).collect();

        let mut series = Vec::with_capacity(columns.len());
        for (idx, (name, kind)) in columns.iter().enumerate() {
            let s = match kind {
                ColumnKind::Int => {
                    let values: Vec<Option<i64>> = rows.iter().map(|r| r[idx].as_i64()).collect();
                    Series::new(name, values)
                }
                ColumnKind::Float => {
                    let values: Vec<Option<f64>> = rows.iter().map(|r| r[idx].as_f64()).collect();
                    Series::new(name, values)
                }
                ColumnKind::Text => {
                    let values: Vec<Option<String>> =
                        rows.iter().map(|r| r[idx].as_text()).collect();
                    Series::new(name, values)
                }
            };
            series.push(s);
        }

        Ok(DataFrame::new(series)?)
    }

    /// Counts describing a finished run
    pub fn summary(&self) -> FeatureSummary {
        let mut summary = FeatureSummary {
            rows: self.rows.len(),
            ..FeatureSummary::default()
        };
        for row in &self.rows {
            for score in RiskScore::ALL {
                if row.imputed.contains(score) {
                    summary.imputed[score.index()] += 1;
                }
            }
            if row.missing_flags.map_or(false, |f| f.employment) {
                summary.employment_missing += 1;
            }
            if row.age_group.is_none() {
                summary.unbinned_ages += 1;
            }
            summary.with_bureau += row.bureau.is_some() as usize;
            summary.with_previous += row.previous.is_some() as usize;
            summary.with_installments += row.installments.is_some() as usize;
        }
        summary
    }
}

/// Columns computed by the pipeline, in output order
pub fn derived_columns() -> Vec<(&'static str, ColumnKind)> {
    let mut cols = vec![
        (AGE_YEARS, ColumnKind::Float),
        (EMPLOYMENT_YEARS, ColumnKind::Float),
    ];
    for score in RiskScore::ALL {
        cols.push((score.missing_flag_column(), ColumnKind::Int));
    }
    cols.push((EMPLOYMENT_MISSING, ColumnKind::Int));
    for name in FinancialRatios::COLUMNS {
        cols.push((name, ColumnKind::Float));
    }
    cols.push((AGE_GROUP, ColumnKind::Text));
    cols.extend(SupplementaryAggregates::columns());
    cols
}

/// Whether a source column name clashes with a typed or derived column
pub fn is_reserved_column(name: &str) -> bool {
    columns::APPLICANT_TYPED
        .iter()
        .copied()
        .chain(derived_columns().into_iter().map(|(n, _)| n))
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

fn aggregate_cells<A: Aggregate>(agg: Option<&A>) -> Vec<Cell> {
    match agg {
        Some(a) => a.cells(),
        None => vec![Cell::Missing; A::columns().len()],
    }
}

/// Check that two feature tables expose the same model inputs
pub fn ensure_aligned(train: &FeatureTable, test: &FeatureTable) -> Result<()> {
    let train_cols: Vec<String> = train.feature_columns().into_iter().map(|(n, _)| n).collect();
    let test_cols: Vec<String> = test.feature_columns().into_iter().map(|(n, _)| n).collect();

    if train_cols == test_cols {
        return Ok(());
    }

    let only_train: Vec<&String> = train_cols.iter().filter(|c| !test_cols.contains(c)).collect();
    let only_test: Vec<&String> = test_cols.iter().filter(|c| !train_cols.contains(c)).collect();
    Err(CreditError::ColumnMismatch(format!(
        "only in training: {:?}; only in test: {:?}",
        only_train, only_test
    )))
}

/// Per-run counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    pub rows: usize,
    pub imputed: [usize; 3],
    pub employment_missing: usize,
    pub unbinned_ages: usize,
    pub with_bureau: usize,
    pub with_previous: usize,
    pub with_installments: usize,
}

impl fmt::Display for FeatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows: {}", self.rows)?;
        for score in RiskScore::ALL {
            writeln!(f, "imputed {}: {}", score, self.imputed[score.index()])?;
        }
        writeln!(f, "employment missing: {}", self.employment_missing)?;
        writeln!(f, "unbinned ages: {}", self.unbinned_ages)?;
        writeln!(f, "with bureau history: {}", self.with_bureau)?;
        writeln!(f, "with previous applications: {}", self.with_previous)?;
        write!(f, "with installments: {}", self.with_installments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(has_target: bool) -> FeatureTable {
        let mut record = ApplicantRecord::new(1);
        if has_target {
            record.target = Some(0);
        }
        record.passthrough = vec![Some("M".to_string())];
        let applicants =
            ApplicantTable::with_passthrough(vec!["CODE_GENDER".to_string()], vec![record])
                .unwrap();
        FeatureTable::from_applicants(applicants)
    }

    #[test]
    fn test_cells_align_with_columns() {
        let t = table(true);
        let cells = t.row_cells(&t.rows()[0]);
        assert_eq!(cells.len(), t.columns().len());
    }

    #[test]
    fn test_target_not_a_feature() {
        let t = table(true);
        assert!(t.columns().iter().any(|(n, _)| n == "TARGET"));
        assert!(!t.feature_columns().iter().any(|(n, _)| n == "TARGET"));
    }

    #[test]
    fn test_alignment_ignores_target() {
        assert!(ensure_aligned(&table(true), &table(false)).is_ok());
    }

    #[test]
    fn test_alignment_detects_extra_column() {
        let train = table(false);
        let test = FeatureTable::from_applicants(
            ApplicantTable::new(vec![ApplicantRecord::new(2)]).unwrap(),
        );
        let err = ensure_aligned(&train, &test).unwrap_err();
        assert!(err.to_string().contains("CODE_GENDER"));
    }

    #[test]
    fn test_unjoined_aggregates_are_missing() {
        let t = table(false);
        let cells = t.row_cells(&t.rows()[0]);
        let names: Vec<String> = t.columns().into_iter().map(|(n, _)| n).collect();
        let idx = names.iter().position(|n| n == "BUREAU_LOAN_COUNT").unwrap();
        assert!(cells[idx].is_missing());
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::from(Some(f64::NAN)), Cell::Missing);
        assert_eq!(Cell::from(true), Cell::Int(1));
        assert_eq!(Cell::from(None::<i32>), Cell::Missing);
        assert_eq!(Cell::Float(0.5).to_string(), "0.5");
        assert_eq!(Cell::Missing.to_string(), "");
    }

    #[test]
    fn test_to_dataframe_shape() {
        let t = table(true);
        let df = t.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), t.columns().len());
    }
}
