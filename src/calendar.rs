//! Calendar month arithmetic used by the indexation calculator

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// Month of year (1-12)
    pub month: u32,
}

impl YearMonth {
    /// Create a month, returning `None` when `month` is outside 1-12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Following calendar month, rolling over into January of the next year
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Previous calendar month
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Day before the first of the next month; 31 only outside chrono's date range
    pub fn days_in_month(self) -> u32 {
        self.next()
            .first_day()
            .and_then(|d| d.pred_opt())
            .map_or(31, |d| d.day())
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Last day of the month preceding `today`
///
/// Used as the default indexation cutoff: the current month never has a published CPI.
pub fn last_day_of_previous_month(today: NaiveDate) -> NaiveDate {
    let previous = YearMonth::of(today).prev();
    previous.last_day().unwrap_or(today)
}

/// The days of one calendar month covered by a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPortion {
    pub month: YearMonth,
    /// First covered day of month (1-based, inclusive)
    pub first_day: u32,
    /// Last covered day of month (inclusive)
    pub last_day: u32,
}

impl MonthPortion {
    pub fn days_counted(&self) -> u32 {
        self.last_day - self.first_day + 1
    }

    pub fn days_in_month(&self) -> u32 {
        self.month.days_in_month()
    }

    pub fn is_full_month(&self) -> bool {
        self.days_counted() == self.days_in_month()
    }
}

/// Iterator over the months spanned by an inclusive date range `[start, end]`
///
/// The first and last portions are clipped to the range; every month in between is full.
/// An inverted range yields nothing.
#[derive(Debug, Clone)]
pub struct MonthSpan {
    start: NaiveDate,
    end: NaiveDate,
    current: Option<YearMonth>,
}

impl MonthSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let current = if start <= end { Some(YearMonth::of(start)) } else { None };
        Self { start, end, current }
    }
}

impl Iterator for MonthSpan {
    type Item = MonthPortion;

    fn next(&mut self) -> Option<MonthPortion> {
        let month = self.current?;
        let end_month = YearMonth::of(self.end);

        let first_day = if month == YearMonth::of(self.start) { self.start.day() } else { 1 };
        let last_day = if month == end_month { self.end.day() } else { month.days_in_month() };

        self.current = if month == end_month { None } else { Some(month.next()) };

        Some(MonthPortion { month, first_day, last_day })
    }
}
