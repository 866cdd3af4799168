//! Split a debt's timeline into periods delimited by payments
//!
//! Each payment closes a period that includes the payment date itself; the next period
//! starts the following day on the reduced balance. A debt paid off in full stops
//! accruing right after the payment that clears it.

use super::calculator::{compute_period_indexation, MonthSlice, PeriodIndexation};
use crate::cases::Payment;
use crate::cpi::CpiTable;
use crate::error::IndexationError;
use crate::money::round_half_up;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A contiguous span accruing indexation on a single balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub debt_before: Decimal,
    /// Payment that closes the period, if any
    pub payment_date: Option<NaiveDate>,
    pub payment_amount: Decimal,
    pub debt_after_payment: Decimal,
    pub indexation: Decimal,
    pub monthly_breakdown: Vec<MonthSlice>,
}

impl Period {
    /// Number of calendar days in the period, both ends included
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn has_payment(&self) -> bool {
        self.payment_date.is_some()
    }
}

/// Qualifying payments as dated events: only `date <= cutoff_date` and `amount > 0`,
/// same-day payments summed, sorted by date
pub fn aggregate_payments(payments: &[Payment], cutoff_date: NaiveDate) -> Vec<Payment> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for payment in payments {
        if payment.date <= cutoff_date && payment.amount > Decimal::ZERO {
            *by_date.entry(payment.date).or_insert(Decimal::ZERO) += payment.amount;
        }
    }

    by_date
        .into_iter()
        .map(|(date, amount)| Payment::new(date, amount))
        .collect()
}

/// Build the period breakdown of one debt from `order_date` to `cutoff_date`
///
/// Payments dated before `order_date` are deducted from the opening balance; if they
/// settle it, no periods are produced. An `order_date` after the cutoff yields no periods.
pub fn compute_debt_periods(
    order_date: NaiveDate,
    base_amount: Decimal,
    payments: &[Payment],
    cpi_table: &CpiTable,
    cutoff_date: NaiveDate,
) -> Result<Vec<Period>, IndexationError> {
    if order_date > cutoff_date {
        log::debug!("Order date {} is after cutoff {}, nothing to index", order_date, cutoff_date);
        return Ok(Vec::new());
    }

    let (prepaid, events): (Vec<Payment>, Vec<Payment>) = aggregate_payments(payments, cutoff_date)
        .into_iter()
        .partition(|p| p.date < order_date);

    // Payments made before the order reduce the awarded sum but open no period
    let mut opening_debt = base_amount;
    for payment in &prepaid {
        log::debug!("Payment of {} on {} predates order date {}", payment.amount, payment.date, order_date);
        opening_debt -= payment.amount;
    }
    if !prepaid.is_empty() && opening_debt <= Decimal::ZERO {
        log::debug!("Debt settled before order date {}, nothing to index", order_date);
        return Ok(Vec::new());
    }

    if events.is_empty() {
        let indexation = compute_period_indexation(opening_debt, order_date, cutoff_date, cpi_table)?;
        return Ok(vec![open_period(order_date, cutoff_date, opening_debt, indexation)]);
    }

    let mut periods = Vec::with_capacity(events.len() + 1);
    let mut remaining_debt = opening_debt;
    let mut current_start = order_date;

    for event in &events {
        let period_end = event.date.min(cutoff_date);
        let indexation = compute_period_indexation(remaining_debt, current_start, period_end, cpi_table)?;
        let debt_after_payment = remaining_debt - event.amount;

        log::debug!(
            "Period {} .. {}: debt {} indexed by {}, paid {}",
            current_start,
            period_end,
            remaining_debt,
            indexation.total_increment,
            event.amount
        );

        periods.push(Period {
            start_date: current_start,
            end_date: period_end,
            debt_before: remaining_debt,
            payment_date: Some(event.date),
            payment_amount: event.amount,
            debt_after_payment,
            indexation: indexation.total_increment,
            monthly_breakdown: indexation.monthly_breakdown,
        });

        remaining_debt = debt_after_payment;
        if remaining_debt <= Decimal::ZERO {
            return Ok(periods);
        }

        match event.date.succ_opt() {
            Some(next_start) if next_start <= cutoff_date => current_start = next_start,
            _ => return Ok(periods),
        }
    }

    if remaining_debt > Decimal::ZERO && current_start <= cutoff_date {
        let indexation = compute_period_indexation(remaining_debt, current_start, cutoff_date, cpi_table)?;
        periods.push(open_period(current_start, cutoff_date, remaining_debt, indexation));
    }

    Ok(periods)
}

/// Period without a closing payment
fn open_period(
    start_date: NaiveDate,
    end_date: NaiveDate,
    debt: Decimal,
    indexation: PeriodIndexation,
) -> Period {
    Period {
        start_date,
        end_date,
        debt_before: debt,
        payment_date: None,
        payment_amount: round_half_up(Decimal::ZERO),
        debt_after_payment: debt,
        indexation: indexation.total_increment,
        monthly_breakdown: indexation.monthly_breakdown,
    }
}
