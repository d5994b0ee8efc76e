mod assistant;
mod courses;
mod insights;
mod messages;
mod quizzes;
mod study;
mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Query for endpoints that only make sense for one user.
#[derive(Debug, Deserialize)]
pub(crate) struct UserQuery {
    pub user_id: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(users::routes())
        .merge(courses::routes())
        .merge(quizzes::routes())
        .merge(study::routes())
        .merge(messages::routes())
        .merge(assistant::routes())
        .merge(insights::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

pub(crate) fn require_text(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", what)));
    }
    Ok(())
}

pub(crate) fn deleted(found: bool) -> Result<StatusCode, AppError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
