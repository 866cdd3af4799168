//! Lenient parsing of dates and amounts as they appear in spreadsheet exports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y-%m-%d %H:%M:%S"];

/// Parse `YYYY-MM-DD`, `DD.MM.YYYY` or a spreadsheet timestamp at midnight
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(raw, fmt)
            .ok()
            .or_else(|| chrono::NaiveDateTime::parse_from_str(raw, fmt).ok().map(|dt| dt.date()))
    })
}

/// Parse a decimal amount, accepting `,` as the decimal separator and
/// spaces (including non-breaking ones) as thousands separators
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
