//! Calendar date parsing and rendering.
//!
//! Dates are stored as plain calendar days in UTC. Clients send them as
//! `YYYY-MM-DD` (or a full RFC 3339 timestamp, whose UTC day is kept) and
//! receive them in the human-readable `Sun Jan 15 2023` form.

use chrono::{DateTime, NaiveDate, Utc};

const ISO_DATE: &str = "%Y-%m-%d";
const DISPLAY_DATE: &str = "%a %b %d %Y";

/// Parse a client-supplied date, returning None if it is not recognised
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(input, ISO_DATE).ok().or_else(|| {
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Render a date as e.g. `Mon Jan 01 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// Today's calendar date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
