//! Date window handling
//!
//! A run is scoped to an inclusive `[start, end]` date window. At the system
//! boundary both dates travel as `DD-MM-YYYY` text; inside the crate they are
//! `chrono::NaiveDate`.

mod resolver;

pub use resolver::previous_month;

use crate::{HarvestError, WindowError};
use chrono::NaiveDate;
use std::fmt;

/// Textual date format used by the trigger and the search site
pub const BOUNDARY_FORMAT: &str = "%d-%m-%Y";

/// Inclusive date window for one run
///
/// Construction always checks `start <= end`, so a `DateWindow` that exists
/// is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window from two dates
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::StartAfterEnd {
                start: format_boundary(start),
                end: format_boundary(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from its `DD-MM-YYYY` textual form
    ///
    /// # Example
    ///
    /// ```
    /// use wrc_harvest::window::DateWindow;
    ///
    /// let window = DateWindow::parse("01-01-2024", "31-01-2024").unwrap();
    /// assert_eq!(window.start_text(), "01-01-2024");
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        let start = parse_boundary("start_date", start)?;
        let end = parse_boundary("end_date", end)?;
        Self::new(start, end)
    }

    /// Builds a window from the trigger's optional parameters
    ///
    /// Either parameter missing is a `MissingParameter` failure; a malformed
    /// or inverted window is an `InvalidWindow` failure.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Self, HarvestError> {
        let start = start.ok_or(HarvestError::MissingParameter("start_date"))?;
        let end = end.ok_or(HarvestError::MissingParameter("end_date"))?;
        Ok(Self::parse(start, end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start date in `DD-MM-YYYY` form
    pub fn start_text(&self) -> String {
        format_boundary(self.start)
    }

    /// End date in `DD-MM-YYYY` form
    pub fn end_text(&self) -> String {
        format_boundary(self.end)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_text(), self.end_text())
    }
}

/// Formats a date in the boundary `DD-MM-YYYY` form
pub fn format_boundary(date: NaiveDate) -> String {
    date.format(BOUNDARY_FORMAT).to_string()
}

fn parse_boundary(field: &'static str, value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value.trim(), BOUNDARY_FORMAT).map_err(|_| WindowError::Malformed {
        field,
        value: value.to_string(),
    })
}
