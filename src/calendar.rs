use chrono::{Months, NaiveDate};

/// Same day of month, clamped to the last day of a shorter target month
/// (2024-01-31 + 1 = 2024-02-29). `None` only past chrono's date range.
pub fn add_calendar_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}
