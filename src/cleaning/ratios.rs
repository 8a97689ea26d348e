//! Financial ratios
//!
//! A ratio is missing when either operand is missing or the quotient is not
//! finite (zero denominator). No clamping or rounding is applied.

use crate::applicant::ApplicantRecord;
use crate::types::present;

pub const CREDIT_INCOME_RATIO: &str = "CREDIT_INCOME_RATIO";
pub const ANNUITY_INCOME_RATIO: &str = "ANNUITY_INCOME_RATIO";
pub const CREDIT_GOODS_RATIO: &str = "CREDIT_GOODS_RATIO";

/// `numerator / denominator` with explicit missing for undefined results
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let value = present(numerator)? / present(denominator)?;
    value.is_finite().then_some(value)
}

/// Ratios derived from the applicant's monetary fields
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialRatios {
    pub credit_income: Option<f64>,
    pub annuity_income: Option<f64>,
    pub credit_goods: Option<f64>,
}

impl FinancialRatios {
    pub const COLUMNS: [&'static str; 3] =
        [CREDIT_INCOME_RATIO, ANNUITY_INCOME_RATIO, CREDIT_GOODS_RATIO];

    pub fn from_record(record: &ApplicantRecord) -> Self {
        Self {
            credit_income: ratio(record.amt_credit, record.amt_income_total),
            annuity_income: ratio(record.amt_annuity, record.amt_income_total),
            credit_goods: ratio(record.amt_credit, record.amt_goods_price),
        }
    }

    /// Values aligned with [`FinancialRatios::COLUMNS`]
    pub fn values(&self) -> [Option<f64>; 3] {
        [self.credit_income, self.annuity_income, self.credit_goods]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(Some(300.0), Some(100.0)), Some(3.0));
        assert_eq!(ratio(Some(0.0), Some(100.0)), Some(0.0));
    }

    #[test]
    fn test_ratio_undefined_cases() {
        assert_eq!(ratio(Some(300.0), Some(0.0)), None);
        assert_eq!(ratio(Some(0.0), Some(0.0)), None);
        assert_eq!(ratio(None, Some(10.0)), None);
        assert_eq!(ratio(Some(10.0), None), None);
        assert_eq!(ratio(Some(f64::NAN), Some(10.0)), None);
    }

    #[test]
    fn test_from_record() {
        let record = ApplicantRecord {
            amt_income_total: Some(200_000.0),
            amt_credit: Some(500_000.0),
            amt_annuity: Some(25_000.0),
            amt_goods_price: Some(450_000.0),
            ..ApplicantRecord::new(1)
        };
        let ratios = FinancialRatios::from_record(&record);

        assert_relative_eq!(ratios.credit_income.unwrap(), 2.5);
        assert_relative_eq!(ratios.annuity_income.unwrap(), 0.125);
        assert_relative_eq!(ratios.credit_goods.unwrap(), 500_000.0 / 450_000.0);
    }

    #[test]
    fn test_negative_values_not_clamped() {
        assert_eq!(ratio(Some(-50.0), Some(100.0)), Some(-0.5));
    }
}
