//! Error creation and message formatting

use rusty_credit::applicant::{ApplicantRecord, ApplicantTable};
use rusty_credit::error::CreditError;
use rusty_credit::params::{FittedParams, ParameterStore};

#[cfg(test)]
mod error_message_tests {
    use super::*;

    // ========== Usage errors ==========

    #[test]
    fn test_not_fitted() {
        let err = ParameterStore::new().snapshot().unwrap_err();
        assert!(matches!(err, CreditError::NotFitted(_)));
        assert!(err.to_string().contains("not fitted"));
    }

    #[test]
    fn test_missing_column() {
        let err = CreditError::MissingColumn("EXT_SOURCE_2".to_string());
        assert_eq!(err.to_string(), "Column 'EXT_SOURCE_2' not found");
    }

    #[test]
    fn test_duplicate_applicant() {
        let err = ApplicantTable::new(vec![ApplicantRecord::new(7), ApplicantRecord::new(7)])
            .unwrap_err();
        assert!(matches!(err, CreditError::DuplicateApplicant(7)));
        assert!(err.to_string().contains('7'));
    }

    // ========== Fit errors ==========

    #[test]
    fn test_all_missing_column() {
        let table = ApplicantTable::new(vec![ApplicantRecord {
            ext_source_2: Some(0.4),
            ext_source_3: Some(0.4),
            ..ApplicantRecord::new(1)
        }])
        .unwrap();
        let err = FittedParams::fit(&table).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("EXT_SOURCE_1"));
        assert!(msg.contains("all 1 values are missing"));
    }

    #[test]
    fn test_invalid_parameter() {
        let err = FittedParams::from_medians(0.1, f64::NAN, 0.3).unwrap_err();
        assert!(matches!(err, CreditError::InvalidParameter { .. }));
        assert!(err.to_string().contains("EXT_SOURCE_2"));
    }

    // ========== Data errors ==========

    #[test]
    fn test_parse_error_message() {
        let err = CreditError::ParseError {
            row: 3,
            column: "AMT_CREDIT".to_string(),
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("AMT_CREDIT"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CreditError = io.into();
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_column_mismatch() {
        let err = CreditError::ColumnMismatch("only in training: [\"X\"]".to_string());
        assert!(err.to_string().contains("only in training"));
    }
}
