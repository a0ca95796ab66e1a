//! Core domain types for the exlog system.
//!
//! This module defines:
//! - Stored records (users with embedded exercises)
//! - Inputs accepted by the data access layer
//! - Response views shaped for the HTTP layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Stored Records
// ============================================================================

/// A single exercise entry, owned by exactly one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub description: String,
    pub duration: i64,
    pub date: NaiveDate,
}

/// A user document with its embedded exercise list in insertion order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl User {
    /// Create a user with a fresh id and no exercises
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            exercises: Vec::new(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            id: self.id,
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// A duration as clients send it: a JSON number or a (form) string
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DurationValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl DurationValue {
    /// Coerce to an integer, truncating fractional values
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DurationValue::Int(n) => Some(*n),
            DurationValue::Float(f) => float_to_integer(*f),
            DurationValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_integer))
            }
        }
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

/// Fields supplied when appending an exercise; all optional until validated
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewExercise {
    pub description: Option<String>,
    pub duration: Option<DurationValue>,
    pub date: Option<String>,
}

// ============================================================================
// Views
// ============================================================================

/// User projected to identity fields only
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub id: Uuid,
}

/// Flattened view of a newly appended exercise merged with its owner
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseView {
    pub username: String,
    pub description: String,
    pub duration: i64,
    pub date: String,
    pub id: Uuid,
}

/// One rendered entry of a user's log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub description: String,
    pub duration: i64,
    pub date: String,
}

/// Filtered, formatted log with its entry count
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseLog {
    pub count: usize,
    pub log: Vec<LogEntry>,
}

/// Response shape of the logs endpoint
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLog {
    pub username: String,
    pub count: usize,
    pub id: Uuid,
    pub log: Vec<LogEntry>,
}

impl UserLog {
    pub fn new(user: &User, log: ExerciseLog) -> Self {
        Self {
            username: user.username.clone(),
            count: log.count,
            id: user.id,
            log: log.log,
        }
    }
}
