use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{LoanError, Result};

/// whole calendar months from `from` to `to`
///
/// Counts by year/month arithmetic, then drops the final month when the
/// anniversary day has not been reached yet. A `to` before `from` yields
/// zero.
pub fn elapsed_whole_months(from: NaiveDate, to: NaiveDate) -> u32 {
    let years = to.year() - from.year();
    let months = to.month() as i32 - from.month() as i32;
    let mut total = years * 12 + months;

    if to.day() < from.day() {
        total -= 1;
    }

    total.max(0) as u32
}

/// `date` moved forward by `months`, clamped to the last day of the target month
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::InvalidDate {
            message: format!("{} plus {} months is out of range", date, months),
        })
}

/// parse a storage-side date, accepting plain dates and RFC 3339 timestamps
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    chrono::DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc().date())
        .map_err(|_| LoanError::InvalidDate {
            message: format!("unrecognised date '{}'", value),
        })
}
