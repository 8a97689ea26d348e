//! History records keyed to an applicant
//!
//! Each table holds one row per historical event. Many rows may share an
//! applicant key.

use crate::types::{Amount, ApplicantId, Days};
use serde::{Deserialize, Serialize};

/// Credit reported by the external bureau
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BureauRecord {
    pub applicant_id: ApplicantId,
    /// Credit status, e.g. "Active", "Closed", "Sold"
    pub credit_active: Option<String>,
    pub amt_credit_sum_overdue: Option<Amount>,
    pub amt_credit_sum_debt: Option<Amount>,
    pub amt_credit_sum: Option<Amount>,
}

impl BureauRecord {
    pub fn new(applicant_id: ApplicantId, credit_active: &str) -> Self {
        Self {
            applicant_id,
            credit_active: Some(credit_active.to_string()),
            amt_credit_sum_overdue: None,
            amt_credit_sum_debt: None,
            amt_credit_sum: None,
        }
    }

    /// Set overdue, debt and total credit amounts
    pub fn with_amounts(
        mut self,
        overdue: Option<Amount>,
        debt: Option<Amount>,
        credit_sum: Option<Amount>,
    ) -> Self {
        self.amt_credit_sum_overdue = overdue;
        self.amt_credit_sum_debt = debt;
        self.amt_credit_sum = credit_sum;
        self
    }
}

/// Earlier loan application by the same applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousApplicationRecord {
    pub applicant_id: ApplicantId,
    /// Decision, e.g. "Approved", "Refused", "Canceled"
    pub name_contract_status: Option<String>,
}

impl PreviousApplicationRecord {
    pub fn new(applicant_id: ApplicantId, status: Option<&str>) -> Self {
        Self {
            applicant_id,
            name_contract_status: status.map(str::to_string),
        }
    }
}

/// One scheduled installment and when it was actually paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRecord {
    pub applicant_id: ApplicantId,
    pub days_instalment: Option<Days>,
    pub days_entry_payment: Option<Days>,
}

impl InstallmentRecord {
    pub fn new(
        applicant_id: ApplicantId,
        days_instalment: Option<Days>,
        days_entry_payment: Option<Days>,
    ) -> Self {
        Self {
            applicant_id,
            days_instalment,
            days_entry_payment,
        }
    }

    /// Days between the scheduled and the actual payment (positive = late)
    pub fn payment_delay(&self) -> Option<Days> {
        match (self.days_instalment, self.days_entry_payment) {
            (Some(due), Some(paid)) if !due.is_nan() && !paid.is_nan() => Some(paid - due),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_delay() {
        let late = InstallmentRecord::new(1, Some(-30.0), Some(-25.0));
        assert_eq!(late.payment_delay(), Some(5.0));

        let early = InstallmentRecord::new(1, Some(-30.0), Some(-32.0));
        assert_eq!(early.payment_delay(), Some(-2.0));

        let unpaid = InstallmentRecord::new(1, Some(-30.0), None);
        assert_eq!(unpaid.payment_delay(), None);

        let nan = InstallmentRecord::new(1, Some(f64::NAN), Some(-1.0));
        assert_eq!(nan.payment_delay(), None);
    }
}
