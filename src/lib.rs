//! Debt Indexation - month-by-month CPI indexation of court-awarded sums
//!
//! This library provides:
//! - CPI table loading with per-month lookup and coverage checks
//! - Exact decimal indexation of an amount over a date range, pro-rating partial months
//! - Period segmentation of a debt by its partial payments
//! - Batch runs over many cases with cutoff clamping to CPI coverage
//! - CSV summary and audit-table reports

pub mod calendar;
pub mod cpi;
pub mod cases;
pub mod indexation;
pub mod batch;
pub mod report;
pub mod money;
pub mod parse;
pub mod error;

// Re-export commonly used types
pub use calendar::{MonthSpan, YearMonth};
pub use cpi::CpiTable;
pub use cases::{DebtCase, Payment};
pub use indexation::{compute_case, compute_debt_periods, compute_period_indexation, CaseIndexation, MonthSlice, Period};
pub use batch::{BatchConfig, BatchReport, BatchRunner};
pub use error::{IndexationError, LoadError};
