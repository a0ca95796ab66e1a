//! Log filtering and formatting.
//!
//! Applies an optional `from`/`to` date window and a `limit` to a user's
//! exercises in their natural (insertion) order.

use crate::dates::{format_date, parse_date};
use crate::{Exercise, ExerciseLog, LogEntry};
use chrono::NaiveDate;

/// Optional bounds for a log query. Both date bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl LogFilter {
    /// Build a filter from raw query parameters
    ///
    /// Values that fail to parse are dropped, so a malformed bound behaves
    /// as if it had not been supplied.
    pub fn from_query(from: Option<&str>, to: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            from: from.and_then(|raw| parse_bound("from", raw)),
            to: to.and_then(|raw| parse_bound("to", raw)),
            limit: limit.and_then(parse_limit),
        }
    }

    /// Exercises that pass the filter, in their original order
    pub fn select<'a>(&'a self, exercises: &'a [Exercise]) -> impl Iterator<Item = &'a Exercise> + 'a {
        exercises
            .iter()
            .filter(move |exercise| self.admits(exercise.date))
            .take(self.limit.unwrap_or(usize::MAX))
    }

    fn admits(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

fn parse_bound(name: &str, raw: &str) -> Option<NaiveDate> {
    let parsed = parse_date(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::debug!("Ignoring unparseable '{}' filter: {:?}", name, raw);
    }
    parsed
}

fn parse_limit(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<usize>() {
        Ok(limit) => Some(limit),
        Err(_) => {
            tracing::debug!("Ignoring unparseable 'limit' filter: {:?}", raw);
            None
        }
    }
}

/// Filter and render a user's exercises
pub fn filter_log(exercises: &[Exercise], filter: &LogFilter) -> ExerciseLog {
    let log: Vec<LogEntry> = filter
        .select(exercises)
        .map(|exercise| LogEntry {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: format_date(exercise.date),
        })
        .collect();

    ExerciseLog {
        count: log.len(),
        log,
    }
}
