//! Indexation of a complete debt case

use super::periods::{compute_debt_periods, Period};
use crate::cases::DebtCase;
use crate::cpi::CpiTable;
use crate::error::IndexationError;
use crate::money::round_half_up;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Computed indexation of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseIndexation {
    pub registration_number: String,
    pub order_date: NaiveDate,
    pub base_amount: Decimal,
    /// Cutoff actually applied to this case
    pub cutoff_date: NaiveDate,
    pub periods: Vec<Period>,
    pub total_indexation: Decimal,
}

impl CaseIndexation {
    /// Length of the indexation window in days, both ends included
    pub fn total_days(&self) -> i64 {
        ((self.cutoff_date - self.order_date).num_days() + 1).max(0)
    }

    /// Payments that fell inside the computation window
    pub fn total_paid(&self) -> Decimal {
        self.periods.iter().map(|p| p.payment_amount).sum()
    }

    pub fn month_count(&self) -> usize {
        self.periods.iter().map(|p| p.monthly_breakdown.len()).sum()
    }
}

/// Compute periods and total indexation for one case up to `cutoff_date`
///
/// A cutoff set on the case itself is honoured when it is earlier.
pub fn compute_case(
    case: &DebtCase,
    cpi_table: &CpiTable,
    cutoff_date: NaiveDate,
) -> Result<CaseIndexation, IndexationError> {
    let cutoff_date = case.cutoff_within(cutoff_date);
    let periods = compute_debt_periods(
        case.order_date,
        case.base_amount,
        &case.payments,
        cpi_table,
        cutoff_date,
    )?;

    let total_indexation = round_half_up(periods.iter().map(|p| p.indexation).sum::<Decimal>());

    log::debug!(
        "Case {}: {} period(s), indexation {}",
        case.registration_number,
        periods.len(),
        total_indexation
    );

    Ok(CaseIndexation {
        registration_number: case.registration_number.clone(),
        order_date: case.order_date,
        base_amount: case.base_amount,
        cutoff_date,
        periods,
        total_indexation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> CpiTable {
        [
            (YearMonth::new(2024, 1).unwrap(), dec!(100.86)),
            (YearMonth::new(2024, 2).unwrap(), dec!(100.68)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_total_is_sum_of_periods() {
        let case = DebtCase::new("42", date(2024, 1, 1), dec!(10000.00))
            .with_payment(date(2024, 1, 31), dec!(4000));
        let result = compute_case(&case, &table(), date(2024, 2, 29)).unwrap();

        assert_eq!(result.periods.len(), 2);
        assert_eq!(result.total_indexation, dec!(126.80));
        assert_eq!(result.total_days(), 60);
        assert_eq!(result.total_paid(), dec!(4000));
        assert_eq!(result.month_count(), 2);
    }

    #[test]
    fn test_case_cutoff_applies_when_earlier() {
        let case = DebtCase::new("42", date(2024, 1, 1), dec!(10000.00)).with_cutoff(date(2024, 1, 31));
        let result = compute_case(&case, &table(), date(2024, 2, 29)).unwrap();

        assert_eq!(result.cutoff_date, date(2024, 1, 31));
        assert_eq!(result.total_indexation, dec!(86.00));
    }

    #[test]
    fn test_order_after_cutoff_is_zero() {
        let case = DebtCase::new("42", date(2024, 3, 1), dec!(10000.00));
        let result = compute_case(&case, &table(), date(2024, 2, 29)).unwrap();

        assert!(result.periods.is_empty());
        assert_eq!(result.total_indexation.to_string(), "0.00");
        assert_eq!(result.total_days(), 0);
    }
}
