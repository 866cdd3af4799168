//! Monthly consumer price index table

use crate::calendar::YearMonth;
use crate::error::IndexationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Monthly CPI values keyed by calendar month
///
/// Values are percentages relative to the previous month: `100.84` means prices rose 0.84%.
/// The table is built once and only read afterwards, so it can be shared across threads
/// by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpiTable {
    values: BTreeMap<YearMonth, Decimal>,
}

impl CpiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one if the month was already present
    pub fn insert(&mut self, month: YearMonth, value: Decimal) -> Option<Decimal> {
        self.values.insert(month, value)
    }

    /// CPI value for a month
    pub fn get(&self, month: YearMonth) -> Result<Decimal, IndexationError> {
        self.values
            .get(&month)
            .copied()
            .ok_or(IndexationError::MissingIndex(month))
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.values.contains_key(&month)
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.values.keys().next().copied()
    }

    /// Latest month with a published value
    pub fn last_month(&self) -> Option<YearMonth> {
        self.values.keys().next_back().copied()
    }

    /// Last calendar day covered by the table
    pub fn last_covered_date(&self) -> Option<NaiveDate> {
        self.last_month().and_then(YearMonth::last_day)
    }

    /// Months between the first and last entries that have no value
    pub fn gaps(&self) -> Vec<YearMonth> {
        let (Some(first), Some(last)) = (self.first_month(), self.last_month()) else {
            return Vec::new();
        };

        let mut missing = Vec::new();
        let mut month = first;
        while month < last {
            if !self.contains(month) {
                missing.push(month);
            }
            month = month.next();
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(YearMonth, Decimal)> for CpiTable {
    fn from_iter<I: IntoIterator<Item = (YearMonth, Decimal)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
