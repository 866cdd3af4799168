//! Debt case and payment records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment made towards a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl Payment {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self { date, amount }
    }
}

/// A court-awarded debt to be indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtCase {
    /// Registration number of the court order
    pub registration_number: String,

    /// Date the order was issued; indexation starts here
    pub order_date: NaiveDate,

    /// Awarded amount at the order date
    pub base_amount: Decimal,

    /// Payments in arbitrary order; aggregation happens at computation time
    pub payments: Vec<Payment>,

    /// Per-case cutoff; the batch cutoff applies when absent
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
}

impl DebtCase {
    pub fn new(registration_number: impl Into<String>, order_date: NaiveDate, base_amount: Decimal) -> Self {
        Self {
            registration_number: registration_number.into(),
            order_date,
            base_amount,
            payments: Vec::new(),
            cutoff_date: None,
        }
    }

    /// Builder-style helper to attach a payment
    pub fn with_payment(mut self, date: NaiveDate, amount: Decimal) -> Self {
        self.payments.push(Payment::new(date, amount));
        self
    }

    pub fn with_cutoff(mut self, cutoff_date: NaiveDate) -> Self {
        self.cutoff_date = Some(cutoff_date);
        self
    }

    /// Cutoff for this case: its own if set, never later than the batch cutoff
    pub fn cutoff_within(&self, batch_cutoff: NaiveDate) -> NaiveDate {
        match self.cutoff_date {
            Some(own) => own.min(batch_cutoff),
            None => batch_cutoff,
        }
    }

    pub fn total_paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cutoff_within_batch() {
        let case = DebtCase::new("17", date(2024, 1, 15), dec!(10000.00));
        assert_eq!(case.cutoff_within(date(2024, 6, 30)), date(2024, 6, 30));

        let case = case.with_cutoff(date(2024, 3, 31));
        assert_eq!(case.cutoff_within(date(2024, 6, 30)), date(2024, 3, 31));
        assert_eq!(case.cutoff_within(date(2024, 2, 29)), date(2024, 2, 29));
    }

    #[test]
    fn test_total_paid() {
        let case = DebtCase::new("17", date(2024, 1, 15), dec!(10000.00))
            .with_payment(date(2024, 2, 1), dec!(1500.50))
            .with_payment(date(2024, 3, 1), dec!(499.50));
        assert_eq!(case.total_paid(), dec!(2000.00));
    }
}
