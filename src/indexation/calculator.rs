//! Month-by-month indexation of a fixed amount over a date range
//!
//! Each month multiplies the running amount by
//! `1 + (CPI / 100 - 1) * days_counted / days_in_month` and rounds the result to kopecks
//! before moving on, so later months compound the rounded amount. Full months therefore
//! apply the CPI unscaled and only the edge months of a range are pro-rated.

use crate::calendar::{MonthPortion, MonthSpan};
use crate::cpi::CpiTable;
use crate::error::IndexationError;
use crate::money::round_half_up;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// One month of an indexation period, as shown in the audit table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSlice {
    pub year: i32,
    pub month: u32,
    pub days_counted: u32,
    pub days_in_month: u32,
    pub cpi_value: Decimal,
    /// Multiplier actually applied: CPI excess pro-rated by the day fraction
    pub effective_factor: Decimal,
    pub increment: Decimal,
}

/// Indexation of one amount over one date range
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodIndexation {
    pub total_increment: Decimal,
    pub monthly_breakdown: Vec<MonthSlice>,
}

impl PeriodIndexation {
    /// Result for a degenerate range or non-positive amount
    pub fn zero() -> Self {
        Self {
            total_increment: round_half_up(Decimal::ZERO),
            monthly_breakdown: Vec::new(),
        }
    }
}

/// Running state threaded through the month fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accrual {
    /// Indexed amount after the months processed so far, rounded to kopecks
    pub current_amount: Decimal,
    pub total_increment: Decimal,
    pub breakdown: Vec<MonthSlice>,
}

impl Accrual {
    pub fn new(amount: Decimal) -> Self {
        Self {
            current_amount: amount,
            total_increment: round_half_up(Decimal::ZERO),
            breakdown: Vec::new(),
        }
    }

    /// Apply one month's CPI to the running amount
    pub fn step(mut self, portion: &MonthPortion, cpi_value: Decimal) -> Self {
        let days_counted = portion.days_counted();
        let days_in_month = portion.days_in_month();

        let effective_factor = effective_factor(cpi_value, days_counted, days_in_month);
        let new_amount = round_half_up(self.current_amount * effective_factor);
        let increment = new_amount - self.current_amount;

        self.breakdown.push(MonthSlice {
            year: portion.month.year,
            month: portion.month.month,
            days_counted,
            days_in_month,
            cpi_value,
            effective_factor,
            increment,
        });
        self.total_increment += increment;
        self.current_amount = new_amount;
        self
    }

    pub fn finish(self) -> PeriodIndexation {
        PeriodIndexation {
            total_increment: self.total_increment,
            monthly_breakdown: self.breakdown,
        }
    }
}

/// `1 + (cpi / 100 - 1) * days_counted / days_in_month`
pub fn effective_factor(cpi_value: Decimal, days_counted: u32, days_in_month: u32) -> Decimal {
    let monthly_factor = cpi_value / HUNDRED;
    if days_counted == days_in_month {
        return monthly_factor;
    }
    let proportion = Decimal::from(days_counted) / Decimal::from(days_in_month);
    Decimal::ONE + (monthly_factor - Decimal::ONE) * proportion
}

/// Indexation of `amount` over the inclusive range `[start_date, end_date]`
///
/// Returns a zero result with an empty breakdown when `amount <= 0` or the range is
/// inverted. Fails with [`IndexationError::MissingIndex`] on the first month that has no
/// CPI value; no partial result is returned in that case.
pub fn compute_period_indexation(
    amount: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cpi_table: &CpiTable,
) -> Result<PeriodIndexation, IndexationError> {
    if amount <= Decimal::ZERO || start_date > end_date {
        return Ok(PeriodIndexation::zero());
    }

    let accrual = MonthSpan::new(start_date, end_date).try_fold(Accrual::new(amount), |acc, portion| {
        let cpi_value = cpi_table.get(portion.month)?;
        Ok::<_, IndexationError>(acc.step(&portion, cpi_value))
    })?;

    Ok(accrual.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn table_2024() -> CpiTable {
        [
            (ym(2024, 1), dec!(100.86)),
            (ym(2024, 2), dec!(100.68)),
            (ym(2024, 3), dec!(100.39)),
            (ym(2024, 4), dec!(100.50)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_full_month() {
        let table: CpiTable = [(ym(2024, 1), dec!(100.84))].into_iter().collect();
        let result =
            compute_period_indexation(dec!(10000.00), date(2024, 1, 1), date(2024, 1, 31), &table).unwrap();

        assert_eq!(result.total_increment, dec!(84.00));
        assert_eq!(result.monthly_breakdown.len(), 1);

        let slice = &result.monthly_breakdown[0];
        assert_eq!((slice.days_counted, slice.days_in_month), (31, 31));
        assert_eq!(slice.effective_factor, dec!(1.0084));
        assert_eq!(slice.increment, dec!(84.00));
    }

    #[test]
    fn test_partial_month_is_pro_rated() {
        let table: CpiTable = [(ym(2024, 1), dec!(100.84))].into_iter().collect();
        let result =
            compute_period_indexation(dec!(10000.00), date(2024, 1, 15), date(2024, 1, 31), &table).unwrap();

        let slice = &result.monthly_breakdown[0];
        assert_eq!(slice.days_counted, 17);
        assert_eq!(slice.effective_factor, Decimal::ONE + dec!(0.0084) * (dec!(17) / dec!(31)));
        // 10000 * 0.0084 * 17 / 31 = 46.0645...
        assert_eq!(result.total_increment, dec!(46.06));
    }

    #[test]
    fn test_multi_month_compounds_rounded_amount() {
        let result =
            compute_period_indexation(dec!(10000.00), date(2024, 1, 15), date(2024, 3, 10), &table_2024()).unwrap();

        let increments: Vec<Decimal> = result.monthly_breakdown.iter().map(|s| s.increment).collect();
        // Jan: 17/31 of 0.86% on 10000.00 -> 10047.16
        // Feb: full 0.68% on 10047.16 -> 10115.48
        // Mar: 10/31 of 0.39% on 10115.48 -> 10128.21
        assert_eq!(increments, vec![dec!(47.16), dec!(68.32), dec!(12.73)]);
        assert_eq!(result.total_increment, dec!(128.21));
        assert_eq!(result.total_increment, increments.iter().copied().sum::<Decimal>());

        let days: Vec<(u32, u32)> = result
            .monthly_breakdown
            .iter()
            .map(|s| (s.days_counted, s.days_in_month))
            .collect();
        assert_eq!(days, vec![(17, 31), (29, 29), (10, 31)]);
    }

    #[test]
    fn test_rounding_is_half_up_each_month() {
        // 100.50 * 1.01 = 101.505 -> 101.51
        let table: CpiTable = [(ym(2024, 1), dec!(101.00)), (ym(2024, 2), dec!(101.00))]
            .into_iter()
            .collect();
        let one = compute_period_indexation(dec!(100.50), date(2024, 1, 1), date(2024, 1, 31), &table).unwrap();
        assert_eq!(one.total_increment, dec!(1.01));

        // Feb compounds the rounded 101.51: 101.51 * 1.01 = 102.5251 -> 102.53
        let two = compute_period_indexation(dec!(100.50), date(2024, 1, 1), date(2024, 2, 29), &table).unwrap();
        assert_eq!(two.monthly_breakdown[1].increment, dec!(1.02));
        assert_eq!(two.total_increment, dec!(2.03));
    }

    #[test]
    fn test_identical_inputs_give_identical_results() {
        let table = table_2024();
        let a = compute_period_indexation(dec!(12345.67), date(2024, 1, 3), date(2024, 4, 17), &table).unwrap();
        let b = compute_period_indexation(dec!(12345.67), date(2024, 1, 3), date(2024, 4, 17), &table).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.total_increment.to_string(), b.total_increment.to_string());
    }

    #[test]
    fn test_degenerate_inputs_are_no_ops() {
        let table = table_2024();

        let inverted = compute_period_indexation(dec!(100), date(2024, 2, 1), date(2024, 1, 31), &table).unwrap();
        assert_eq!(inverted, PeriodIndexation::zero());
        assert_eq!(inverted.total_increment.to_string(), "0.00");

        let zero = compute_period_indexation(Decimal::ZERO, date(2024, 1, 1), date(2024, 1, 31), &table).unwrap();
        assert!(zero.monthly_breakdown.is_empty());

        let negative = compute_period_indexation(dec!(-5), date(2024, 1, 1), date(2024, 1, 31), &table).unwrap();
        assert_eq!(negative, PeriodIndexation::zero());
    }

    #[test]
    fn test_missing_month_is_an_error() {
        let result = compute_period_indexation(dec!(1000), date(2024, 3, 1), date(2024, 5, 15), &table_2024());
        assert_eq!(result, Err(IndexationError::MissingIndex(ym(2024, 5))));
    }

    #[test]
    fn test_deflation_month_decreases_amount() {
        let table: CpiTable = [(ym(2024, 8), dec!(99.80))].into_iter().collect();
        let result = compute_period_indexation(dec!(1000.00), date(2024, 8, 1), date(2024, 8, 31), &table).unwrap();
        assert_eq!(result.total_increment, dec!(-2.00));
    }

    #[test]
    fn test_step_function_threads_state() {
        let portion = MonthSpan::new(date(2024, 2, 1), date(2024, 2, 29)).next().unwrap();
        let state = Accrual::new(dec!(1000.00)).step(&portion, dec!(100.68));

        assert_eq!(state.current_amount, dec!(1006.80));
        assert_eq!(state.total_increment, dec!(6.80));
        assert_eq!(state.breakdown.len(), 1);
    }
}
