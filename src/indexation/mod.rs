//! Indexation engine: monthly calculator, period segmentation, per-case orchestration

mod calculator;
mod periods;
mod case;

pub use calculator::{compute_period_indexation, effective_factor, Accrual, MonthSlice, PeriodIndexation};
pub use periods::{aggregate_payments, compute_debt_periods, Period};
pub use case::{compute_case, CaseIndexation};
