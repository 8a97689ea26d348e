//! CSV readers for applicant and history tables
//!
//! Columns are located by header name (case-insensitive). Empty cells and
//! the usual NA spellings read as missing.

use crate::applicant::{ApplicantRecord, ApplicantTable};
use crate::error::{CreditError, Result};
use crate::history::{BureauRecord, InstallmentRecord, PreviousApplicationRecord};
use crate::types::{columns, ApplicantId};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Cell contents treated as missing
const MISSING_TOKENS: [&str; 6] = ["", "NA", "N/A", "NaN", "nan", "null"];

/// Reader for the applicant table and the three history tables
#[derive(Debug, Clone)]
pub struct CsvTableReader {
    delimiter: u8,
}

impl CsvTableReader {
    /// Create a comma-delimited reader
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set a custom delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn open(&self, path: &Path) -> Result<csv::Reader<File>> {
        let file = File::open(path)?;
        Ok(self.builder().from_reader(file))
    }

    fn builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(Trim::All);
        builder
    }

    /// Load an applicant table from a file
    pub fn read_applicants(&self, path: &Path) -> Result<ApplicantTable> {
        let reader = self.open(path)?;
        let table = Self::applicants_from_csv(reader)?;
        log::info!("Loaded {} applicants from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load an applicant table from any reader
    pub fn read_applicants_from<R: Read>(&self, source: R) -> Result<ApplicantTable> {
        Self::applicants_from_csv(self.builder().from_reader(source))
    }

    fn applicants_from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<ApplicantTable> {
        let headers = reader.headers()?.clone();

        let id = find_column(&headers, columns::SK_ID_CURR)?;
        let target = optional_column(&headers, columns::TARGET);
        let days_birth = find_column(&headers, columns::DAYS_BIRTH)?;
        let days_employed = find_column(&headers, columns::DAYS_EMPLOYED)?;
        let ext1 = find_column(&headers, columns::EXT_SOURCE_1)?;
        let ext2 = find_column(&headers, columns::EXT_SOURCE_2)?;
        let ext3 = find_column(&headers, columns::EXT_SOURCE_3)?;
        let income = find_column(&headers, columns::AMT_INCOME_TOTAL)?;
        let credit = find_column(&headers, columns::AMT_CREDIT)?;
        let annuity = find_column(&headers, columns::AMT_ANNUITY)?;
        let goods = find_column(&headers, columns::AMT_GOODS_PRICE)?;

        let passthrough: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                !columns::APPLICANT_TYPED
                    .iter()
                    .any(|typed| typed.eq_ignore_ascii_case(name))
            })
            .map(|(idx, _)| idx)
            .collect();
        let passthrough_columns: Vec<String> =
            passthrough.iter().map(|idx| headers[*idx].to_string()).collect();

        let mut rows = Vec::new();
        for (n, result) in reader.records().enumerate() {
            let record = result?;
            let row = n + 1;
            let cell = |idx: usize| RawCell {
                record: &record,
                headers: &headers,
                idx,
                row,
            };

            rows.push(ApplicantRecord {
                id: cell(id).id()?,
                target: match target {
                    Some(idx) => cell(idx).label()?,
                    None => None,
                },
                days_birth: cell(days_birth).number()?,
                days_employed: cell(days_employed).number()?,
                ext_source_1: cell(ext1).number()?,
                ext_source_2: cell(ext2).number()?,
                ext_source_3: cell(ext3).number()?,
                amt_income_total: cell(income).number()?,
                amt_credit: cell(credit).number()?,
                amt_annuity: cell(annuity).number()?,
                amt_goods_price: cell(goods).number()?,
                passthrough: passthrough.iter().map(|idx| cell(*idx).text()).collect(),
            });
        }

        Ok(ApplicantTable::with_passthrough(passthrough_columns, rows)?
            .with_target_column(target.is_some()))
    }

    /// Load bureau credits from a file
    pub fn read_bureau(&self, path: &Path) -> Result<Vec<BureauRecord>> {
        let records = Self::bureau_from_csv(self.open(path)?)?;
        log::info!("Loaded {} bureau rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Load bureau credits from any reader
    pub fn read_bureau_from<R: Read>(&self, source: R) -> Result<Vec<BureauRecord>> {
        Self::bureau_from_csv(self.builder().from_reader(source))
    }

    fn bureau_from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<BureauRecord>> {
        let headers = reader.headers()?.clone();
        let id = find_column(&headers, columns::SK_ID_CURR)?;
        let status = find_column(&headers, columns::CREDIT_ACTIVE)?;
        let overdue = find_column(&headers, columns::AMT_CREDIT_SUM_OVERDUE)?;
        let debt = find_column(&headers, columns::AMT_CREDIT_SUM_DEBT)?;
        let credit_sum = find_column(&headers, columns::AMT_CREDIT_SUM)?;

        let mut out = Vec::new();
        for (n, result) in reader.records().enumerate() {
            let record = result?;
            let cell = |idx: usize| RawCell {
                record: &record,
                headers: &headers,
                idx,
                row: n + 1,
            };
            out.push(BureauRecord {
                applicant_id: cell(id).id()?,
                credit_active: cell(status).text(),
                amt_credit_sum_overdue: cell(overdue).number()?,
                amt_credit_sum_debt: cell(debt).number()?,
                amt_credit_sum: cell(credit_sum).number()?,
            });
        }
        Ok(out)
    }

    /// Load previous applications from a file
    pub fn read_previous_applications(&self, path: &Path) -> Result<Vec<PreviousApplicationRecord>> {
        let records = Self::previous_from_csv(self.open(path)?)?;
        log::info!(
            "Loaded {} previous applications from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    /// Load previous applications from any reader
    pub fn read_previous_applications_from<R: Read>(
        &self,
        source: R,
    ) -> Result<Vec<PreviousApplicationRecord>> {
        Self::previous_from_csv(self.builder().from_reader(source))
    }

    fn previous_from_csv<R: Read>(
        mut reader: csv::Reader<R>,
    ) -> Result<Vec<PreviousApplicationRecord>> {
        let headers = reader.headers()?.clone();
        let id = find_column(&headers, columns::SK_ID_CURR)?;
        let status = find_column(&headers, columns::NAME_CONTRACT_STATUS)?;

        let mut out = Vec::new();
        for (n, result) in reader.records().enumerate() {
            let record = result?;
            let cell = |idx: usize| RawCell {
                record: &record,
                headers: &headers,
                idx,
                row: n + 1,
            };
            out.push(PreviousApplicationRecord {
                applicant_id: cell(id).id()?,
                name_contract_status: cell(status).text(),
            });
        }
        Ok(out)
    }

    /// Load installment payments from a file
    pub fn read_installments(&self, path: &Path) -> Result<Vec<InstallmentRecord>> {
        let records = Self::installments_from_csv(self.open(path)?)?;
        log::info!(
            "Loaded {} installment rows from {}",
            records.len(),
            path.display()
        );
        Ok(records)
    }

    /// Load installment payments from any reader
    pub fn read_installments_from<R: Read>(&self, source: R) -> Result<Vec<InstallmentRecord>> {
        Self::installments_from_csv(self.builder().from_reader(source))
    }

    fn installments_from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<InstallmentRecord>> {
        let headers = reader.headers()?.clone();
        let id = find_column(&headers, columns::SK_ID_CURR)?;
        let due = find_column(&headers, columns::DAYS_INSTALMENT)?;
        let paid = find_column(&headers, columns::DAYS_ENTRY_PAYMENT)?;

        let mut out = Vec::new();
        for (n, result) in reader.records().enumerate() {
            let record = result?;
            let cell = |idx: usize| RawCell {
                record: &record,
                headers: &headers,
                idx,
                row: n + 1,
            };
            out.push(InstallmentRecord {
                applicant_id: cell(id).id()?,
                days_instalment: cell(due).number()?,
                days_entry_payment: cell(paid).number()?,
            });
        }
        Ok(out)
    }
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find column index by name
fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    optional_column(headers, name).ok_or_else(|| CreditError::MissingColumn(name.to_string()))
}

fn optional_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

/// One cell of a data row, with enough context for error messages
struct RawCell<'r> {
    record: &'r StringRecord,
    headers: &'r StringRecord,
    idx: usize,
    row: usize,
}

impl RawCell<'_> {
    fn raw(&self) -> Option<&str> {
        self.record
            .get(self.idx)
            .filter(|v| !MISSING_TOKENS.contains(v))
    }

    fn error(&self) -> CreditError {
        CreditError::ParseError {
            row: self.row,
            column: self.headers.get(self.idx).unwrap_or_default().to_string(),
            value: self.record.get(self.idx).unwrap_or_default().to_string(),
        }
    }

    fn number(&self) -> Result<Option<f64>> {
        match self.raw() {
            None => Ok(None),
            Some(v) => v.parse::<f64>().map(Some).map_err(|_| self.error()),
        }
    }

    fn id(&self) -> Result<ApplicantId> {
        self.raw()
            .and_then(|v| v.parse::<ApplicantId>().ok())
            .ok_or_else(|| self.error())
    }

    /// Integer label; "1.0" style values from float exports are accepted
    fn label(&self) -> Result<Option<i32>> {
        match self.raw() {
            None => Ok(None),
            Some(v) => match v.parse::<i32>() {
                Ok(label) => Ok(Some(label)),
                Err(_) => match v.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0
                        && f >= i32::MIN as f64
                        && f <= i32::MAX as f64 =>
                    {
                        Ok(Some(f as i32))
                    }
                    _ => Err(self.error()),
                },
            },
        }
    }

    fn text(&self) -> Option<String> {
        self.raw().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLICANTS: &str = "\
SK_ID_CURR,TARGET,CODE_GENDER,DAYS_BIRTH,DAYS_EMPLOYED,EXT_SOURCE_1,EXT_SOURCE_2,EXT_SOURCE_3,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY,AMT_GOODS_PRICE
100002,1,M,-9461,-637,0.083,0.263,0.139,202500.0,406597.5,24700.5,351000.0
100003,0,F,-16765,365243,,0.622,,270000.0,1293502.5,35698.5,1129500.0
";

    #[test]
    fn test_read_applicants() {
        let table = CsvTableReader::new()
            .read_applicants_from(APPLICANTS.as_bytes())
            .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_target());
        assert_eq!(table.passthrough_columns(), &["CODE_GENDER".to_string()]);

        let first = &table.rows()[0];
        assert_eq!(first.id, 100002);
        assert_eq!(first.target, Some(1));
        assert_eq!(first.days_birth, Some(-9461.0));
        assert_eq!(first.passthrough, vec![Some("M".to_string())]);

        let second = &table.rows()[1];
        assert_eq!(second.ext_source_1, None);
        assert_eq!(second.ext_source_3, None);
        assert_eq!(second.days_employed, Some(365_243.0));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "SK_ID_CURR,DAYS_BIRTH\n1,-10000\n";
        let err = CsvTableReader::new()
            .read_applicants_from(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(err, CreditError::MissingColumn(ref c) if c == "DAYS_EMPLOYED"));
    }

    #[test]
    fn test_unparseable_number_reports_position() {
        let csv = APPLICANTS.replace("-9461", "abc");
        let err = CsvTableReader::new()
            .read_applicants_from(csv.as_bytes())
            .unwrap_err();
        match err {
            CreditError::ParseError { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "DAYS_BIRTH");
                assert_eq!(value, "abc");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_test_table_without_target() {
        let csv = "\
SK_ID_CURR,DAYS_BIRTH,DAYS_EMPLOYED,EXT_SOURCE_1,EXT_SOURCE_2,EXT_SOURCE_3,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY,AMT_GOODS_PRICE
100001,-19241,-2329,0.752,0.789,0.159,135000.0,568800.0,20560.5,450000.0
";
        let table = CsvTableReader::new()
            .read_applicants_from(csv.as_bytes())
            .unwrap();
        assert!(!table.has_target());
        assert_eq!(table.rows()[0].target, None);
    }

    #[test]
    fn test_float_label_accepted() {
        let csv = APPLICANTS.replace("100002,1,", "100002,1.0,");
        let table = CsvTableReader::new()
            .read_applicants_from(csv.as_bytes())
            .unwrap();
        assert_eq!(table.rows()[0].target, Some(1));
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let csv = APPLICANTS.replace("100002,1,", "100002,1e12,");
        let err = CsvTableReader::new()
            .read_applicants_from(csv.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            CreditError::ParseError { row: 1, ref column, ref value } if column == "TARGET" && value == "1e12"
        ));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = APPLICANTS.replace(',', ";");
        let table = CsvTableReader::with_delimiter(b';')
            .read_applicants_from(csv.as_bytes())
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].amt_credit, Some(406_597.5));
        assert_eq!(table.passthrough_columns(), &["CODE_GENDER".to_string()]);
    }

    #[test]
    fn test_read_history_tables() {
        let reader = CsvTableReader::new();

        let bureau = reader
            .read_bureau_from(
                "SK_ID_CURR,SK_ID_BUREAU,CREDIT_ACTIVE,AMT_CREDIT_SUM,AMT_CREDIT_SUM_DEBT,AMT_CREDIT_SUM_OVERDUE\n\
                 100,1,Active,1000,300,\n\
                 100,2,Closed,500,,0\n"
                    .as_bytes(),
            )
            .unwrap();
        assert_eq!(bureau.len(), 2);
        assert_eq!(bureau[0].credit_active.as_deref(), Some("Active"));
        assert_eq!(bureau[0].amt_credit_sum_overdue, None);
        assert_eq!(bureau[1].amt_credit_sum_debt, None);

        let previous = reader
            .read_previous_applications_from(
                "SK_ID_PREV,SK_ID_CURR,NAME_CONTRACT_STATUS\n1,100,Approved\n2,100,\n".as_bytes(),
            )
            .unwrap();
        assert_eq!(previous[1].name_contract_status, None);

        let installments = reader
            .read_installments_from(
                "SK_ID_CURR,DAYS_INSTALMENT,DAYS_ENTRY_PAYMENT\n100,-30,-28\n100,-60,NA\n".as_bytes(),
            )
            .unwrap();
        assert_eq!(installments[0].payment_delay(), Some(2.0));
        assert_eq!(installments[1].days_entry_payment, None);
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = CsvTableReader::new()
            .read_previous_applications_from(
                "SK_ID_CURR,NAME_CONTRACT_STATUS\n,Approved\n".as_bytes(),
            )
            .unwrap_err();
        assert!(matches!(err, CreditError::ParseError { .. }));
    }
}
