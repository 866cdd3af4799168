//! Load the CPI table from CSV
//!
//! Expected columns: `Year,Month,CPI`. The Russian headers of the statistics workbook
//! export (`Год,Месяц,Индексы потребительских цен`) are accepted as well.

use super::CpiTable;
use crate::calendar::YearMonth;
use crate::error::LoadError;
use crate::parse::parse_decimal;
use csv::Reader;
use rust_decimal::Decimal;
use std::path::Path;

/// Default CPI file name inside the data directory
pub const CPI_FILE: &str = "cpi.csv";

/// Raw CSV row of the CPI sheet
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Year", alias = "Год")]
    year: i32,
    #[serde(rename = "Month", alias = "Месяц")]
    month: u32,
    #[serde(rename = "CPI", alias = "Индексы потребительских цен")]
    value: String,
}

impl CsvRow {
    fn to_entry(&self, row: usize) -> Result<(YearMonth, Decimal), LoadError> {
        let month = YearMonth::new(self.year, self.month).ok_or(LoadError::InvalidMonth {
            row,
            year: self.year,
            month: self.month,
        })?;

        let value = parse_decimal(&self.value).ok_or_else(|| LoadError::InvalidAmount {
            row,
            value: self.value.clone(),
        })?;

        if value <= Decimal::ZERO {
            return Err(LoadError::NonPositiveIndex {
                row,
                month,
                value: self.value.clone(),
            });
        }

        Ok((month, value))
    }
}

/// Load the CPI table from a CSV file
pub fn load_cpi<P: AsRef<Path>>(path: P) -> Result<CpiTable, LoadError> {
    let reader = Reader::from_path(path)?;
    read_cpi(reader)
}

/// Load the CPI table from any reader (e.g., string buffer, network stream)
pub fn load_cpi_from_reader<R: std::io::Read>(reader: R) -> Result<CpiTable, LoadError> {
    read_cpi(Reader::from_reader(reader))
}

fn read_cpi<R: std::io::Read>(mut reader: Reader<R>) -> Result<CpiTable, LoadError> {
    let mut table = CpiTable::new();

    // Row numbers count the header as row 1, matching what a spreadsheet shows
    for (idx, result) in reader.deserialize().enumerate() {
        let row = idx + 2;
        let record: CsvRow = result?;
        let (month, value) = record.to_entry(row)?;
        if table.insert(month, value).is_some() {
            return Err(LoadError::DuplicateIndex { row, month });
        }
    }

    let gaps = table.gaps();
    if !gaps.is_empty() {
        log::warn!("CPI table has {} missing month(s), first is {}", gaps.len(), gaps[0]);
    }
    log::info!(
        "Loaded {} CPI values ({} .. {})",
        table.len(),
        table.first_month().map(|m| m.to_string()).unwrap_or_default(),
        table.last_month().map(|m| m.to_string()).unwrap_or_default(),
    );

    Ok(table)
}
