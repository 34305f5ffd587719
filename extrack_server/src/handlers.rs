//! HTTP route handlers for the exercise tracker.
//!
//! Store calls are synchronous and run on tokio's blocking pool; the core
//! is only invoked once a store round trip has completed.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};

use extrack_core::service::{self, NewExercise};
use extrack_core::{ExerciseCreated, ExerciseStore, LogQuery, LogResponse, UserId, UserSummary};

use crate::error::ApiError;
use crate::request::{CreateUserBody, ExerciseBody, Payload, QueryParams};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExerciseStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ExerciseStore>) -> Self {
        Self { store }
    }

    /// Run a store operation on the blocking pool
    async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn ExerciseStore) -> extrack_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| ApiError::Task(e.to_string()))?;
        Ok(result?)
    }
}

/// Current calendar date in UTC
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Handle GET /api/users
pub async fn handle_list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.with_store(service::list_users).await?;
    Ok(Json(users))
}

/// Handle POST /api/users
///
/// Returns the existing record when the username is already registered.
pub async fn handle_create_user(
    State(state): State<AppState>,
    Payload(body): Payload<CreateUserBody>,
) -> Result<Json<UserSummary>, ApiError> {
    let username = body.username.unwrap_or_default();
    let registration = state
        .with_store(move |store| service::register_user(store, &username))
        .await?;
    Ok(Json(UserSummary::from(&registration.user)))
}

/// Handle POST /api/users/{id}/exercises
pub async fn handle_add_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(body): Payload<ExerciseBody>,
) -> Result<Json<ExerciseCreated>, ApiError> {
    let id = UserId::from(id.as_str());
    let new = NewExercise::from(body);
    let today = today();
    let created = state
        .with_store(move |store| service::add_exercise(store, &id, &new, today))
        .await?;
    Ok(Json(created))
}

/// Handle GET /api/users/{id}/logs
pub async fn handle_user_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<LogQuery>,
) -> Result<Json<LogResponse>, ApiError> {
    let id = UserId::from(id.as_str());
    let today = today();
    let log = state
        .with_store(move |store| service::user_log(store, &id, &query, today))
        .await?;
    Ok(Json(log))
}

/// Handle GET /-/healthy
pub async fn handle_healthy() -> &'static str {
    "OK"
}
