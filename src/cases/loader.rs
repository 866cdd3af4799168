//! Load debt cases and their payments from CSV
//!
//! Cases: `RegNumber,OrderDate,BaseAmount[,CutoffDate]`.
//! Payments: `RegNumber,PaymentDate,Amount`, one file for all cases.
//! Headers of the upstream workbook sheets are accepted as aliases.

use super::{DebtCase, Payment};
use crate::error::LoadError;
use crate::parse::{parse_date, parse_decimal};
use chrono::NaiveDate;
use csv::Reader;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;

pub const CASES_FILE: &str = "cases.csv";
pub const PAYMENTS_FILE: &str = "payments.csv";

/// Raw CSV row of the case sheet
#[derive(Debug, serde::Deserialize)]
struct CaseRow {
    #[serde(rename = "RegNumber", alias = "Рег номер")]
    registration_number: String,
    #[serde(rename = "OrderDate", alias = "Дата вынесения приказа")]
    order_date: String,
    #[serde(rename = "BaseAmount", alias = "Сумма платежей с декабря 2024")]
    base_amount: String,
    #[serde(rename = "CutoffDate", default)]
    cutoff_date: Option<String>,
}

impl CaseRow {
    fn to_case(&self, row: usize) -> Result<DebtCase, LoadError> {
        let mut case = DebtCase::new(
            normalize_registration(&self.registration_number),
            date_field(&self.order_date, row)?,
            amount_field(&self.base_amount, row)?,
        );

        if let Some(raw) = self.cutoff_date.as_deref().filter(|s| !s.trim().is_empty()) {
            case.cutoff_date = Some(date_field(raw, row)?);
        }

        Ok(case)
    }
}

/// Raw CSV row of the payment sheet
#[derive(Debug, serde::Deserialize)]
struct PaymentRow {
    #[serde(rename = "RegNumber", alias = "Рег. номер", alias = "Рег номер")]
    registration_number: String,
    #[serde(rename = "PaymentDate", alias = "Дата платежа")]
    date: String,
    #[serde(rename = "Amount", alias = "Сумма платежа")]
    amount: String,
}

fn date_field(raw: &str, row: usize) -> Result<NaiveDate, LoadError> {
    parse_date(raw).ok_or_else(|| LoadError::InvalidDate {
        row,
        value: raw.to_string(),
    })
}

fn amount_field(raw: &str, row: usize) -> Result<Decimal, LoadError> {
    parse_decimal(raw).ok_or_else(|| LoadError::InvalidAmount {
        row,
        value: raw.to_string(),
    })
}

/// Spreadsheet exports render integer ids as `17.0`
fn normalize_registration(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_string()
}

/// Load cases (without payments) from a CSV file
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<DebtCase>, LoadError> {
    read_cases(Reader::from_path(path)?)
}

pub fn load_cases_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<DebtCase>, LoadError> {
    read_cases(Reader::from_reader(reader))
}

fn read_cases<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<DebtCase>, LoadError> {
    let mut cases: Vec<DebtCase> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row = idx + 2;
        let record: CaseRow = result?;
        let case = record.to_case(row)?;
        if seen.insert(case.registration_number.clone(), row).is_some() {
            return Err(LoadError::DuplicateCase {
                row,
                registration_number: case.registration_number,
            });
        }
        cases.push(case);
    }

    Ok(cases)
}

/// Load payments keyed by registration number
pub fn load_payments<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Vec<Payment>>, LoadError> {
    read_payments(Reader::from_path(path)?)
}

pub fn load_payments_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<HashMap<String, Vec<Payment>>, LoadError> {
    read_payments(Reader::from_reader(reader))
}

fn read_payments<R: std::io::Read>(
    mut reader: Reader<R>,
) -> Result<HashMap<String, Vec<Payment>>, LoadError> {
    let mut payments: HashMap<String, Vec<Payment>> = HashMap::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row = idx + 2;
        let record: PaymentRow = result?;
        let payment = Payment::new(date_field(&record.date, row)?, amount_field(&record.amount, row)?);
        payments
            .entry(normalize_registration(&record.registration_number))
            .or_default()
            .push(payment);
    }

    Ok(payments)
}

/// Attach payments to their cases; payments for unknown registration numbers are dropped
pub fn attach_payments(cases: &mut [DebtCase], mut payments: HashMap<String, Vec<Payment>>) {
    for case in cases.iter_mut() {
        if let Some(list) = payments.remove(&case.registration_number) {
            case.payments.extend(list);
        }
    }

    for (registration_number, orphaned) in &payments {
        log::warn!(
            "Ignoring {} payment(s) for unknown case {}",
            orphaned.len(),
            registration_number
        );
    }
}

/// Load cases and attach their payments
pub fn load_cases_with_payments<P: AsRef<Path>, Q: AsRef<Path>>(
    cases_path: P,
    payments_path: Q,
) -> Result<Vec<DebtCase>, LoadError> {
    let mut cases = load_cases(cases_path)?;
    attach_payments(&mut cases, load_payments(payments_path)?);
    Ok(cases)
}
