//! Shared application state.

use exlog_core::{ExerciseService, UserStore};
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: ExerciseService,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            service: ExerciseService::new(store),
        }
    }
}
