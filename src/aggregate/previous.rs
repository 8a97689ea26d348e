//! Previous application aggregate

use super::{rate, Aggregate};
use crate::features::{Cell, ColumnKind};
use crate::history::PreviousApplicationRecord;
use crate::types::{ApplicantId, Rate};

pub const APPROVED_STATUS: &str = "Approved";
pub const REFUSED_STATUS: &str = "Refused";

/// Per-applicant summary of earlier applications
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousApplicationAggregate {
    pub application_count: usize,
    /// Share of decided applications that were approved
    pub approval_rate: Option<Rate>,
    /// Share of decided applications that were refused
    pub refusal_rate: Option<Rate>,
}

impl Aggregate for PreviousApplicationAggregate {
    type Record = PreviousApplicationRecord;

    const NAME: &'static str = "previous_application";

    fn key(record: &PreviousApplicationRecord) -> ApplicantId {
        record.applicant_id
    }

    fn reduce(records: &[&PreviousApplicationRecord]) -> Self {
        let statuses: Vec<&str> = records
            .iter()
            .filter_map(|r| r.name_contract_status.as_deref())
            .collect();

        let approved = statuses.iter().filter(|s| **s == APPROVED_STATUS).count();
        let refused = statuses.iter().filter(|s| **s == REFUSED_STATUS).count();

        Self {
            application_count: records.len(),
            approval_rate: rate(approved, statuses.len()),
            refusal_rate: rate(refused, statuses.len()),
        }
    }

    fn columns() -> &'static [(&'static str, ColumnKind)] {
        &[
            ("PREV_APP_COUNT", ColumnKind::Int),
            ("PREV_APPROVAL_RATE", ColumnKind::Float),
            ("PREV_REFUSAL_RATE", ColumnKind::Float),
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Int(self.application_count as i64),
            Cell::from(self.approval_rate),
            Cell::from(self.refusal_rate),
        ]
    }
}
