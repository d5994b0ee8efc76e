//! Day-to-day study records: sessions, tasks, notes, flashcards and goals.
//! PUT on a single record behaves like PATCH.

use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::{deleted, require_text};
use crate::db::flashcards::{self, FlashcardFilter};
use crate::db::goals::{self, GoalFilter};
use crate::db::notes::{self, NoteFilter};
use crate::db::sessions::{self, SessionFilter};
use crate::db::tasks::{self, TaskFilter};
use crate::error::AppError;
use crate::models::*;
use crate::services::scheduling;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/studySessions", get(list_sessions).post(create_session))
        .route(
            "/studySessions/{id}",
            get(get_session)
                .patch(update_session)
                .put(update_session)
                .delete(delete_session),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task)
                .patch(update_task)
                .put(update_task)
                .delete(delete_task),
        )
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_note)
                .patch(update_note)
                .put(update_note)
                .delete(delete_note),
        )
        .route("/flashcards", get(list_flashcards).post(create_flashcard))
        .route(
            "/flashcards/{id}",
            get(get_flashcard)
                .patch(update_flashcard)
                .put(update_flashcard)
                .delete(delete_flashcard),
        )
        .route("/flashcards/{id}/review", post(review_flashcard))
        .route("/study_goals", get(list_goals).post(create_goal))
        .route(
            "/study_goals/{id}",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> Result<Json<Vec<StudySession>>, AppError> {
    let sessions = sessions::fetch_sessions(&state.db, &filter).await?;
    Ok(Json(sessions))
}

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<NewStudySessionRequest>,
) -> Result<(StatusCode, Json<StudySession>), AppError> {
    let session = sessions::insert_session(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudySession>, AppError> {
    let session = sessions::find_session_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session))
}

async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStudySessionRequest>,
) -> Result<Json<StudySession>, AppError> {
    let session = sessions::update_session(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(session))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(sessions::delete_session(&state.db, id).await?)
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = tasks::fetch_tasks(&state.db, &filter).await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    require_text(&req.title, "Task title")?;
    let task = tasks::insert_task(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, AppError> {
    let task = tasks::find_task_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = tasks::update_task(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(tasks::delete_task(&state.db, id).await?)
}

async fn list_notes(
    State(state): State<AppState>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = notes::fetch_notes(&state.db, &filter).await?;
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<NewNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    require_text(&req.title, "Note title")?;
    let note = notes::insert_note(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, AppError> {
    let note = notes::find_note_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let note = notes::update_note(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(notes::delete_note(&state.db, id).await?)
}

async fn list_flashcards(
    State(state): State<AppState>,
    Query(filter): Query<FlashcardFilter>,
) -> Result<Json<Vec<Flashcard>>, AppError> {
    let mut cards = flashcards::fetch_flashcards(&state.db, &filter).await?;
    if filter.due {
        let now = Utc::now();
        cards.retain(|card| scheduling::is_due(card, now));
    }
    Ok(Json(cards))
}

async fn create_flashcard(
    State(state): State<AppState>,
    Json(req): Json<NewFlashcardRequest>,
) -> Result<(StatusCode, Json<Flashcard>), AppError> {
    let card = flashcards::insert_flashcard(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn get_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Flashcard>, AppError> {
    let card = flashcards::find_flashcard_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(card))
}

async fn update_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFlashcardRequest>,
) -> Result<Json<Flashcard>, AppError> {
    let card = flashcards::update_flashcard(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(card))
}

async fn delete_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(flashcards::delete_flashcard(&state.db, id).await?)
}

async fn review_flashcard(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewFlashcardRequest>,
) -> Result<Json<Flashcard>, AppError> {
    let card = scheduling::review_flashcard(&state.db, id, req.remembered).await?;
    Ok(Json(card))
}

async fn list_goals(
    State(state): State<AppState>,
    Query(filter): Query<GoalFilter>,
) -> Result<Json<Vec<StudyGoal>>, AppError> {
    let goals = goals::fetch_goals(&state.db, &filter).await?;
    Ok(Json(goals))
}

async fn create_goal(
    State(state): State<AppState>,
    Json(req): Json<NewStudyGoalRequest>,
) -> Result<(StatusCode, Json<StudyGoal>), AppError> {
    require_text(&req.title, "Goal title")?;
    let goal = goals::insert_goal(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StudyGoal>, AppError> {
    let goal = goals::find_goal_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(goal))
}

async fn update_goal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStudyGoalRequest>,
) -> Result<Json<StudyGoal>, AppError> {
    let goal = goals::update_goal(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(goals::delete_goal(&state.db, id).await?)
}
