//! Supplementary aggregators
//!
//! Each aggregator reduces a history table to one summary row per applicant
//! key. Applicants with no history rows get no summary row at all; the
//! pipeline's left join fills their columns with missing values.

pub mod bureau;
pub mod installments;
pub mod previous;

pub use bureau::BureauAggregate;
pub use installments::InstallmentAggregate;
pub use previous::PreviousApplicationAggregate;

use crate::features::{Cell, ColumnKind};
use crate::history::{BureauRecord, InstallmentRecord, PreviousApplicationRecord};
use crate::types::ApplicantId;
use hashbrown::HashMap;

/// Reduction of all history rows sharing one applicant key
pub trait Aggregate: Clone + Send + Sync + Sized {
    /// History row type consumed by this aggregate
    type Record: Sync;

    /// Short name used in logs
    const NAME: &'static str;

    /// Applicant key of a history row
    fn key(record: &Self::Record) -> ApplicantId;

    /// Reduce a non-empty group of rows for one applicant
    fn reduce(records: &[&Self::Record]) -> Self;

    /// Output column names and kinds, in output order
    fn columns() -> &'static [(&'static str, ColumnKind)];

    /// Output values aligned with [`Aggregate::columns`]
    fn cells(&self) -> Vec<Cell>;
}

/// Aggregate rows keyed by applicant, one per key
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable<A> {
    rows: HashMap<ApplicantId, A>,
}

impl<A: Aggregate> AggregateTable<A> {
    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    /// Group history rows by applicant and reduce each group
    pub fn from_records(records: &[A::Record]) -> Self {
        let mut groups: HashMap<ApplicantId, Vec<&A::Record>> = HashMap::new();
        for record in records {
            groups.entry(A::key(record)).or_default().push(record);
        }

        let rows: HashMap<ApplicantId, A> = groups
            .into_iter()
            .map(|(id, group)| (id, A::reduce(&group)))
            .collect();

        log::debug!(
            "{} aggregate: {} history rows reduced to {} applicants",
            A::NAME,
            records.len(),
            rows.len()
        );

        Self { rows }
    }

    /// Get the summary row for an applicant
    pub fn get(&self, id: ApplicantId) -> Option<&A> {
        self.rows.get(&id)
    }

    /// Number of applicants with a summary row
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no applicant has a summary row
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over applicant keys
    pub fn keys(&self) -> impl Iterator<Item = ApplicantId> + '_ {
        self.rows.keys().copied()
    }
}

impl<A: Aggregate> Default for AggregateTable<A> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The three precomputed aggregate tables joined onto applicants
#[derive(Debug, Clone, Default)]
pub struct SupplementaryAggregates {
    pub bureau: AggregateTable<BureauAggregate>,
    pub previous: AggregateTable<PreviousApplicationAggregate>,
    pub installments: AggregateTable<InstallmentAggregate>,
}

impl SupplementaryAggregates {
    /// Aggregates with no history at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute all three aggregates from raw history tables
    ///
    /// With `parallel` set the tables are reduced on the rayon pool; the
    /// output is identical either way.
    pub fn build(
        bureau: &[BureauRecord],
        previous: &[PreviousApplicationRecord],
        installments: &[InstallmentRecord],
        parallel: bool,
    ) -> Self {
        if parallel {
            let (bureau, (previous, installments)) = rayon::join(
                || AggregateTable::from_records(bureau),
                || {
                    rayon::join(
                        || AggregateTable::from_records(previous),
                        || AggregateTable::from_records(installments),
                    )
                },
            );
            Self {
                bureau,
                previous,
                installments,
            }
        } else {
            Self {
                bureau: AggregateTable::from_records(bureau),
                previous: AggregateTable::from_records(previous),
                installments: AggregateTable::from_records(installments),
            }
        }
    }

    /// All aggregate output columns, in output order
    pub fn columns() -> Vec<(&'static str, ColumnKind)> {
        BureauAggregate::columns()
            .iter()
            .chain(PreviousApplicationAggregate::columns())
            .chain(InstallmentAggregate::columns())
            .copied()
            .collect()
    }
}

/// Fraction `hits / total`, missing when there is nothing to count
pub(crate) fn rate(hits: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(hits as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bureau() -> Vec<BureauRecord> {
        vec![
            BureauRecord::new(100, "Active"),
            BureauRecord::new(100, "Closed"),
            BureauRecord::new(200, "Active"),
        ]
    }

    #[test]
    fn test_one_row_per_key() {
        let table = AggregateTable::<BureauAggregate>::from_records(&sample_bureau());
        assert_eq!(table.len(), 2);
        let mut keys: Vec<ApplicantId> = table.keys().collect();
        keys.sort();
        assert_eq!(keys, vec![100, 200]);
    }

    #[test]
    fn test_no_row_without_history() {
        let table = AggregateTable::<BureauAggregate>::from_records(&sample_bureau());
        assert!(table.get(300).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let bureau = sample_bureau();
        let previous = vec![
            PreviousApplicationRecord::new(100, Some("Approved")),
            PreviousApplicationRecord::new(100, Some("Refused")),
        ];
        let installments = vec![
            InstallmentRecord::new(200, Some(-10.0), Some(-8.0)),
            InstallmentRecord::new(200, Some(-40.0), Some(-41.0)),
        ];

        let seq = SupplementaryAggregates::build(&bureau, &previous, &installments, false);
        let par = SupplementaryAggregates::build(&bureau, &previous, &installments, true);

        assert_eq!(seq.bureau, par.bureau);
        assert_eq!(seq.previous, par.previous);
        assert_eq!(seq.installments, par.installments);
    }

    #[test]
    fn test_rate() {
        assert_eq!(rate(0, 0), None);
        assert_eq!(rate(1, 4), Some(0.25));
    }

    #[test]
    fn test_columns_are_unique() {
        let cols = SupplementaryAggregates::columns();
        let mut names: Vec<&str> = cols.iter().map(|(n, _)| *n).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
