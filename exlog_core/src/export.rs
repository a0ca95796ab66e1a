//! CSV export of a user's exercise log.

use crate::log_filter::LogFilter;
use crate::{Exercise, Result, User};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    duration: i64,
}

impl<'a> From<&'a Exercise> for CsvRow<'a> {
    fn from(exercise: &'a Exercise) -> Self {
        CsvRow {
            date: exercise.date.to_string(),
            description: &exercise.description,
            duration: exercise.duration,
        }
    }
}

/// Write the exercises of `user` that pass `filter` as CSV with headers
///
/// Dates are written as `YYYY-MM-DD`. Returns the number of rows written.
pub fn write_user_csv<W: Write>(user: &User, filter: &LogFilter, out: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(out);

    let mut count = 0;
    for exercise in filter.select(&user.exercises) {
        writer.serialize(CsvRow::from(exercise))?;
        count += 1;
    }

    if count == 0 {
        // Header is only emitted with the first record
        writer.write_record(["date", "description", "duration"])?;
    }

    writer.flush()?;
    tracing::info!("Exported {} exercises for user {}", count, user.id);
    Ok(count)
}
