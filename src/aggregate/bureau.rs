//! Bureau credit aggregate

use super::Aggregate;
use crate::features::{Cell, ColumnKind};
use crate::history::BureauRecord;
use crate::types::{Amount, ApplicantId};

/// Status value counted as an open credit (exact, case-sensitive)
pub const ACTIVE_STATUS: &str = "Active";

/// Per-applicant summary of bureau credits
#[derive(Debug, Clone, PartialEq)]
pub struct BureauAggregate {
    pub loan_count: usize,
    pub active_count: usize,
    pub total_overdue: Amount,
    /// Total debt over total credit; missing when total credit is zero
    pub debt_ratio: Option<f64>,
}

impl Aggregate for BureauAggregate {
    type Record = BureauRecord;

    const NAME: &'static str = "bureau";

    fn key(record: &BureauRecord) -> ApplicantId {
        record.applicant_id
    }

    fn reduce(records: &[&BureauRecord]) -> Self {
        let active_count = records
            .iter()
            .filter(|r| r.credit_active.as_deref() == Some(ACTIVE_STATUS))
            .count();

        let total_overdue = sum_or_zero(records.iter().map(|r| r.amt_credit_sum_overdue));
        let total_debt = sum_or_zero(records.iter().map(|r| r.amt_credit_sum_debt));
        let total_credit = sum_or_zero(records.iter().map(|r| r.amt_credit_sum));

        let debt_ratio = if total_credit == 0.0 {
            None
        } else {
            Some(total_debt / total_credit).filter(|v| v.is_finite())
        };

        Self {
            loan_count: records.len(),
            active_count,
            total_overdue,
            debt_ratio,
        }
    }

    fn columns() -> &'static [(&'static str, ColumnKind)] {
        &[
            ("BUREAU_LOAN_COUNT", ColumnKind::Int),
            ("BUREAU_ACTIVE_COUNT", ColumnKind::Int),
            ("BUREAU_TOTAL_OVERDUE", ColumnKind::Float),
            ("BUREAU_DEBT_RATIO", ColumnKind::Float),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Int(self.loan_count as i64),
            Cell::Int(self.active_count as i64),
            Cell::Float(self.total_overdue),
            Cell::from(self.debt_ratio),
        ]
    }
}

/// Sum treating missing and NaN as zero
fn sum_or_zero(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().filter(|v| !v.is_nan()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateTable;
    use approx::assert_relative_eq;

    #[test]
    fn test_counts_per_applicant() {
        let records = vec![
            BureauRecord::new(100, "Active"),
            BureauRecord::new(100, "Closed"),
            BureauRecord::new(200, "Active"),
        ];
        let table = AggregateTable::<BureauAggregate>::from_records(&records);

        let a = table.get(100).unwrap();
        assert_eq!(a.loan_count, 2);
        assert_eq!(a.active_count, 1);

        let b = table.get(200).unwrap();
        assert_eq!(b.loan_count, 1);
        assert_eq!(b.active_count, 1);

        assert!(table.get(300).is_none());
    }

    #[test]
    fn test_active_match_is_case_sensitive() {
        let records = vec![
            BureauRecord::new(1, "active"),
            BureauRecord::new(1, "ACTIVE"),
            BureauRecord::new(1, "Active"),
        ];
        let table = AggregateTable::<BureauAggregate>::from_records(&records);
        assert_eq!(table.get(1).unwrap().active_count, 1);
    }

    #[test]
    fn test_overdue_sum_treats_missing_as_zero() {
        let records = vec![
            BureauRecord::new(1, "Active").with_amounts(Some(100.0), None, None),
            BureauRecord::new(1, "Active").with_amounts(None, None, None),
            BureauRecord::new(1, "Closed").with_amounts(Some(50.5), None, None),
        ];
        let table = AggregateTable::<BureauAggregate>::from_records(&records);
        assert_relative_eq!(table.get(1).unwrap().total_overdue, 150.5);
    }

    #[test]
    fn test_debt_ratio() {
        let records = vec![
            BureauRecord::new(1, "Active").with_amounts(None, Some(300.0), Some(1000.0)),
            BureauRecord::new(1, "Active").with_amounts(None, None, Some(500.0)),
        ];
        let table = AggregateTable::<BureauAggregate>::from_records(&records);
        assert_relative_eq!(table.get(1).unwrap().debt_ratio.unwrap(), 0.2);
    }

    #[test]
    fn test_debt_ratio_missing_for_zero_credit() {
        let records = vec![
            BureauRecord::new(1, "Active").with_amounts(None, Some(300.0), None),
            BureauRecord::new(1, "Closed").with_amounts(None, Some(10.0), Some(0.0)),
        ];
        let table = AggregateTable::<BureauAggregate>::from_records(&records);
        assert_eq!(table.get(1).unwrap().debt_ratio, None);
    }

    #[test]
    fn test_missing_status_not_active() {
        let mut record = BureauRecord::new(1, "Active");
        record.credit_active = None;
        let table = AggregateTable::<BureauAggregate>::from_records(&[record]);
        let agg = table.get(1).unwrap();
        assert_eq!(agg.loan_count, 1);
        assert_eq!(agg.active_count, 0);
    }
}
