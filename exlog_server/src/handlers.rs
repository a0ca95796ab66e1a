use crate::{error::ApiError, error::Result, extract::JsonOrForm, state::AppState};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use exlog_core::{ExerciseView, LogFilter, NewExercise, UserLog, UserSummary};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
}

/// Raw log query; values are parsed leniently by [`LogFilter::from_query`]
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

/// # POST /users
pub async fn create_user(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<CreateUserRequest>,
) -> Result<Json<UserSummary>> {
    let user = state.service.create_user(req.username.as_deref()).await?;
    Ok(Json(user.summary()))
}

/// # GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(state.service.list_users().await?))
}

/// # POST /users/:id/exercises
pub async fn append_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonOrForm(exercise): JsonOrForm<NewExercise>,
) -> Result<Json<ExerciseView>> {
    let view = state.service.append_exercise(&user_id, exercise).await?;
    Ok(Json(view))
}

/// # GET /users/:id/logs?from=&to=&limit=
pub async fn user_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: std::result::Result<Query<LogQuery>, QueryRejection>,
) -> Result<Json<UserLog>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let filter = LogFilter::from_query(
        query.from.as_deref(),
        query.to.as_deref(),
        query.limit.as_deref(),
    );
    Ok(Json(state.service.user_log(&user_id, &filter).await?))
}

/// # GET /health
pub async fn health() -> &'static str {
    "OK"
}
