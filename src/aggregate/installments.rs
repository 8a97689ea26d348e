//! Installment payment aggregate

use super::{rate, Aggregate};
use crate::features::{Cell, ColumnKind};
use crate::history::InstallmentRecord;
use crate::types::{ApplicantId, Days, Rate};
use statrs::statistics::Statistics;

/// Per-applicant summary of installment payment behaviour
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentAggregate {
    /// All installment rows, including those without a known delay
    pub installment_count: usize,
    /// Share of known delays that are positive
    pub late_payment_rate: Option<Rate>,
    /// Mean of known delays in days
    pub avg_payment_delay: Option<Days>,
}

impl Aggregate for InstallmentAggregate {
    type Record = InstallmentRecord;

    const NAME: &'static str = "installments";

    fn key(record: &InstallmentRecord) -> ApplicantId {
        record.applicant_id
    }

    fn reduce(records: &[&InstallmentRecord]) -> Self {
        let delays: Vec<Days> = records.iter().filter_map(|r| r.payment_delay()).collect();
        let late = delays.iter().filter(|d| **d > 0.0).count();

        let avg_payment_delay = if delays.is_empty() {
            None
        } else {
            Some(delays.iter().mean())
        };

        Self {
            installment_count: records.len(),
            late_payment_rate: rate(late, delays.len()),
            avg_payment_delay,
        }
    }

    fn columns() -> &'static [(&'static str, ColumnKind)] {
        &[
            ("INST_COUNT", ColumnKind::Int),
            ("INST_LATE_PAYMENT_RATE", ColumnKind::Float),
            ("INST_AVG_PAYMENT_DELAY", ColumnKind::Float),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Int(self.installment_count as i64),
            Cell::from(self.late_payment_rate),
            Cell::from(self.avg_payment_delay),
        ]
    }
}
