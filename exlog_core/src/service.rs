//! Data access layer.
//!
//! [`ExerciseService`] validates client input, talks to a [`UserStore`] and
//! shapes the views the HTTP layer returns.

use crate::dates::{format_date, parse_date, today};
use crate::log_filter::{filter_log, LogFilter};
use crate::{
    Error, Exercise, ExerciseView, NewExercise, Result, User, UserLog, UserStore, UserSummary,
};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Exercise tracking operations over a shared record store
#[derive(Clone)]
pub struct ExerciseService {
    store: Arc<dyn UserStore>,
}

impl ExerciseService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Create a user with an empty exercise list
    pub async fn create_user(&self, username: Option<&str>) -> Result<User> {
        let username = required("username", username)?;
        let user = self.store.insert_user(User::new(username)).await?;
        tracing::info!(user_id = %user.id, "Created user {}", user.username);
        Ok(user)
    }

    /// All users without their exercises
    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        self.store.list_users().await
    }

    /// Fetch one user including the full exercise list
    pub async fn get_user_with_exercises(&self, user_id: &str) -> Result<User> {
        let id = parse_user_id(user_id)?;
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| Error::NotFound(user_id.to_string()))
    }

    /// Append an exercise dated today (UTC) unless the input carries a date
    pub async fn append_exercise(&self, user_id: &str, input: NewExercise) -> Result<ExerciseView> {
        self.append_exercise_on(user_id, input, today()).await
    }

    /// Append an exercise, using `today` when the input has no date
    pub async fn append_exercise_on(
        &self,
        user_id: &str,
        input: NewExercise,
        today: NaiveDate,
    ) -> Result<ExerciseView> {
        let id = parse_user_id(user_id)?;
        let exercise = build_exercise(input, today)?;

        let owner = self
            .store
            .push_exercise(id, exercise.clone())
            .await?
            .ok_or_else(|| Error::NotFound(user_id.to_string()))?;

        tracing::debug!(user_id = %owner.id, "Appended exercise {:?}", exercise.description);

        Ok(ExerciseView {
            username: owner.username,
            description: exercise.description,
            duration: exercise.duration,
            date: format_date(exercise.date),
            id: owner.id,
        })
    }

    /// A user's filtered, formatted log
    pub async fn user_log(&self, user_id: &str, filter: &LogFilter) -> Result<UserLog> {
        let user = self.get_user_with_exercises(user_id).await?;
        let log = filter_log(&user.exercises, filter);
        Ok(UserLog::new(&user, log))
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::InvalidId(raw.to_string()))
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Validation(format!("{} is required", field))),
    }
}

fn build_exercise(input: NewExercise, today: NaiveDate) -> Result<Exercise> {
    let description = required("description", input.description.as_deref())?.to_string();

    let duration = input
        .duration
        .ok_or_else(|| Error::Validation("duration is required".into()))?;
    let duration = duration
        .as_integer()
        .ok_or_else(|| Error::Validation("duration must be a number".into()))?;

    let date = match input.date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(raw) => parse_date(raw)
            .ok_or_else(|| Error::Validation(format!("invalid date: {}", raw)))?,
    };

    Ok(Exercise {
        id: Uuid::new_v4(),
        description,
        duration,
        date,
    })
}
