use axum::Json;
use axum::extract::Query;
use axum::routing::{get, post};
use axum::{Router, extract::State, http::StatusCode};
use serde::Serialize;

use crate::api::require_text;
use crate::db::chat::{self, ChatFilter};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

/// How many earlier entries are handed to the assistant as context.
const HISTORY_WINDOW: i64 = 20;

#[derive(Debug, Serialize)]
struct ClearedResponse {
    deleted: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/chat_history",
            get(list_history).post(append_history).delete(clear_history),
        )
        .route("/assistant/chat", post(chat))
}

async fn list_history(
    State(state): State<AppState>,
    Query(filter): Query<ChatFilter>,
) -> Result<Json<Vec<ChatEntry>>, AppError> {
    let history = chat::fetch_history(&state.db, &filter).await?;
    Ok(Json(history))
}

async fn append_history(
    State(state): State<AppState>,
    Json(req): Json<NewChatEntryRequest>,
) -> Result<(StatusCode, Json<ChatEntry>), AppError> {
    let entry = chat::insert_entry(&state.db, req.user_id, req.role, &req.content).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn clear_history(
    State(state): State<AppState>,
    Query(filter): Query<ChatFilter>,
) -> Result<Json<ClearedResponse>, AppError> {
    let deleted = chat::clear_history(&state.db, filter.user_id).await?;
    Ok(Json(ClearedResponse { deleted }))
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<AssistantChatRequest>,
) -> Result<Json<ChatEntry>, AppError> {
    require_text(&req.message, "Message")?;

    let history = chat::fetch_recent_history(&state.db, req.user_id, HISTORY_WINDOW).await?;
    chat::insert_entry(&state.db, req.user_id, ChatRole::User, &req.message).await?;

    // the question stays in the history even when the reply fails
    let reply = state.assistant.reply(&req.message, &history).await?;

    let entry = chat::insert_entry(&state.db, req.user_id, ChatRole::Assistant, &reply).await?;
    Ok(Json(entry))
}
