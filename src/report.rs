//! CSV reports: one summary row per case and a month-level audit table per case

use crate::batch::BatchReport;
use crate::indexation::{CaseIndexation, MonthSlice};
use crate::money::format_amount;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

/// Summary row per case
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "RegNumber")]
    registration_number: &'a str,
    #[serde(rename = "OrderDate")]
    order_date: Option<NaiveDate>,
    #[serde(rename = "CutoffDate")]
    cutoff_date: NaiveDate,
    #[serde(rename = "Days")]
    days: Option<i64>,
    #[serde(rename = "BaseAmount")]
    base_amount: String,
    #[serde(rename = "Paid")]
    paid: String,
    #[serde(rename = "Indexation")]
    indexation: String,
    #[serde(rename = "Error")]
    error: String,
}

/// One audit line: a month slice within a period
#[derive(Debug, Serialize)]
struct BreakdownRow {
    #[serde(rename = "Period")]
    period: usize,
    #[serde(rename = "PeriodStart")]
    period_start: NaiveDate,
    #[serde(rename = "PeriodEnd")]
    period_end: NaiveDate,
    #[serde(rename = "DebtBefore")]
    debt_before: String,
    #[serde(rename = "PaymentDate")]
    payment_date: Option<NaiveDate>,
    #[serde(rename = "PaymentAmount")]
    payment_amount: String,
    #[serde(rename = "DebtAfter")]
    debt_after: String,
    #[serde(rename = "Year")]
    year: Option<i32>,
    #[serde(rename = "Month")]
    month: Option<u32>,
    #[serde(rename = "DaysCounted")]
    days_counted: Option<u32>,
    #[serde(rename = "DaysInMonth")]
    days_in_month: Option<u32>,
    #[serde(rename = "CPI")]
    cpi: String,
    #[serde(rename = "Factor")]
    factor: String,
    #[serde(rename = "Increment")]
    increment: String,
}

/// Write one summary row per case; failed cases carry the error text instead of amounts
pub fn write_summary<W: Write>(writer: W, report: &BatchReport) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    for outcome in &report.outcomes {
        let row = match &outcome.result {
            Ok(case) => SummaryRow {
                registration_number: &outcome.registration_number,
                order_date: Some(case.order_date),
                cutoff_date: case.cutoff_date,
                days: Some(case.total_days()),
                base_amount: format_amount(case.base_amount),
                paid: format_amount(case.total_paid()),
                indexation: format_amount(case.total_indexation),
                error: String::new(),
            },
            Err(err) => SummaryRow {
                registration_number: &outcome.registration_number,
                order_date: None,
                cutoff_date: report.effective_cutoff,
                days: None,
                base_amount: String::new(),
                paid: String::new(),
                indexation: String::new(),
                error: err.to_string(),
            },
        };
        out.serialize(row)?;
    }

    out.flush()?;
    Ok(())
}

/// Write the audit table of one case
///
/// Every month slice becomes a row repeating its period's columns. A period with no
/// months (zero balance) still gets one row so every payment shows up.
pub fn write_breakdown<W: Write>(writer: W, case: &CaseIndexation) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);

    for (idx, period) in case.periods.iter().enumerate() {
        let period_row = |slice: Option<&MonthSlice>| BreakdownRow {
            period: idx + 1,
            period_start: period.start_date,
            period_end: period.end_date,
            debt_before: format_amount(period.debt_before),
            payment_date: period.payment_date,
            payment_amount: format_amount(period.payment_amount),
            debt_after: format_amount(period.debt_after_payment),
            year: slice.map(|s| s.year),
            month: slice.map(|s| s.month),
            days_counted: slice.map(|s| s.days_counted),
            days_in_month: slice.map(|s| s.days_in_month),
            cpi: slice.map(|s| s.cpi_value.to_string()).unwrap_or_default(),
            factor: slice.map(|s| s.effective_factor.round_dp(8).normalize().to_string()).unwrap_or_default(),
            increment: slice.map(|s| format_amount(s.increment)).unwrap_or_default(),
        };

        if period.monthly_breakdown.is_empty() {
            out.serialize(period_row(None))?;
        } else {
            for slice in &period.monthly_breakdown {
                out.serialize(period_row(Some(slice)))?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
