use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};

use crate::api::{deleted, require_text};
use crate::db::quizzes::{self, AttemptFilter, QuizFilter};
use crate::error::AppError;
use crate::models::*;
use crate::services::grading;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(list_quizzes).post(create_quiz))
        .route(
            "/quizzes/{id}",
            get(get_quiz).patch(update_quiz).delete(delete_quiz),
        )
        .route("/quizzes/{id}/attempts", post(submit_attempt))
        .route("/quiz_attempts", get(list_attempts))
        .route("/quiz_attempts/{id}", get(get_attempt).delete(delete_attempt))
}

async fn list_quizzes(
    State(state): State<AppState>,
    Query(filter): Query<QuizFilter>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    let quizzes = quizzes::fetch_quizzes(&state.db, &filter).await?;
    Ok(Json(quizzes))
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(req): Json<NewQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    require_text(&req.title, "Quiz title")?;
    let quiz = quizzes::insert_quiz(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = quizzes::find_quiz_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(quiz))
}

async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateQuizRequest>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = quizzes::update_quiz(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(quiz))
}

async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(quizzes::delete_quiz(&state.db, id).await?)
}

async fn submit_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<(StatusCode, Json<QuizAttempt>), AppError> {
    let attempt = grading::submit_attempt(&state.db, id, req).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

async fn list_attempts(
    State(state): State<AppState>,
    Query(filter): Query<AttemptFilter>,
) -> Result<Json<Vec<QuizAttempt>>, AppError> {
    let attempts = quizzes::fetch_attempts(&state.db, &filter).await?;
    Ok(Json(attempts))
}

async fn get_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuizAttempt>, AppError> {
    let attempt = quizzes::find_attempt_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(attempt))
}

async fn delete_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(quizzes::delete_attempt(&state.db, id).await?)
}
