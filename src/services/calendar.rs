use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::AppError;

/// First and last day of a month.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::Validation(format!("Invalid period {}/{}", month, year));

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((first, next.pred_opt().ok_or_else(invalid)?))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn is_working_day(date: NaiveDate, working_days_per_week: i32) -> bool {
    match date.weekday() {
        Weekday::Sat => working_days_per_week >= 6,
        Weekday::Sun => working_days_per_week >= 7,
        _ => true,
    }
}

/// Working days in a month. Monday to Friday always count, Saturday from a
/// six-day week and Sunday from a seven-day week. Returns 0 for an invalid month.
pub fn expected_working_days(year: i32, month: u32, working_days_per_week: i32) -> i64 {
    let Ok((first, last)) = month_range(year, month) else {
        return 0;
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .filter(|date| is_working_day(*date, working_days_per_week))
        .count() as i64
}
