//! Error types for loading inputs and computing indexation

use crate::calendar::YearMonth;
use thiserror::Error;

/// Failure of an indexation computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexationError {
    /// A month touched by the computation has no CPI value
    #[error("CPI value missing for {0}")]
    MissingIndex(YearMonth),

    /// The CPI table has no rows, so no cutoff can be derived from it
    #[error("CPI table is empty")]
    EmptyCpiTable,
}

/// Failure while reading CPI, case or payment input files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid amount '{value}'")]
    InvalidAmount { row: usize, value: String },

    #[error("row {row}: invalid month {year}-{month}")]
    InvalidMonth { row: usize, year: i32, month: u32 },

    #[error("row {row}: duplicate CPI value for {month}")]
    DuplicateIndex { row: usize, month: YearMonth },

    #[error("row {row}: CPI value for {month} must be positive, got {value}")]
    NonPositiveIndex { row: usize, month: YearMonth, value: String },

    #[error("row {row}: duplicate case {registration_number}")]
    DuplicateCase { row: usize, registration_number: String },
}
