use crate::window::DateWindow;
use chrono::{Datelike, Duration, NaiveDate};

/// Resolves the previous calendar month relative to `today`
///
/// `start` is the first day of the month before `today`'s month and `end` is
/// the last day of that same month. Total over every valid date.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use wrc_harvest::window::previous_month;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let window = previous_month(today);
/// assert_eq!(window.start_text(), "01-02-2024");
/// assert_eq!(window.end_text(), "29-02-2024");
/// ```
pub fn previous_month(today: NaiveDate) -> DateWindow {
    let first_of_current = first_of_month(today);
    let end = first_of_current - Duration::days(1);
    let start = first_of_month(end);
    // start is the first of end's month, so the ordering check cannot fail
    DateWindow { start, end }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}
