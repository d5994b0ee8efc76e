use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::get;
use axum::{Router, extract::State};

use crate::api::UserQuery;
use crate::db::users;
use crate::error::AppError;
use crate::models::*;
use crate::services::{progress, recommendations, streaks};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/progress", get(user_progress))
        .route("/study_streaks", get(study_streak))
        .route("/recommendations", get(list_recommendations))
}

async fn user_progress(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProgressReport>, AppError> {
    users::find_user_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let report = progress::progress_for_user(&state.db, id).await?;
    Ok(Json(report))
}

async fn study_streak(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<StudyStreak>, AppError> {
    let streak = streaks::streak_for_user(&state.db, params.user_id).await?;
    Ok(Json(streak))
}

async fn list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let recommendations = recommendations::recommendations_for_user(&state.db, params.user_id).await?;
    Ok(Json(recommendations))
}
