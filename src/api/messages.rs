use axum::Json;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{Router, extract::State, http::StatusCode};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::api::{UserQuery, deleted};
use crate::db::messages::{self, MessageFilter};
use crate::error::AppError;
use crate::models::*;
use crate::services::messaging;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ConversationQuery {
    user_id: i64,
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct MarkReadResponse {
    updated: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages).post(send_message))
        .route("/messages/read", post(mark_read))
        .route("/messages/conversations", get(list_conversations))
        .route("/messages/{id}", patch(update_message).delete(delete_message))
        .route("/ws", get(subscribe))
}

async fn list_messages(
    State(state): State<AppState>,
    Query(filter): Query<MessageFilter>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = messages::fetch_messages(&state.db, &filter).await?;
    Ok(Json(messages))
}

async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<NewMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = messaging::send_message(&state.db, &state.hub, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<Message>, AppError> {
    let message = messages::update_message(&state.db, id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(message))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    deleted(messages::delete_message(&state.db, id).await?)
}

async fn mark_read(
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let updated = messages::mark_conversation_read(&state.db, req.user_id, req.peer_id).await?;
    Ok(Json(MarkReadResponse { updated }))
}

async fn list_conversations(
    State(state): State<AppState>,
    Query(params): Query<ConversationQuery>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    let summaries =
        messaging::conversations_for_user(&state.db, params.user_id, params.q.as_deref()).await?;
    Ok(Json(summaries))
}

async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Response {
    // subscribe before the upgrade so nothing sent in between is missed
    let rx = state.hub.subscribe();
    ws.on_upgrade(move |socket| push_messages(socket, rx, params.user_id))
}

/// The text frame for `user_id`, or `None` when the message is between
/// other users.
fn live_frame(message: &Message, user_id: i64) -> Option<String> {
    if !message.involves(user_id) {
        return None;
    }
    serde_json::to_string(message).ok()
}

async fn push_messages(socket: WebSocket, mut rx: broadcast::Receiver<Message>, user_id: i64) {
    let (mut sender, mut receiver) = socket.split();
    debug!("user {} connected to live messages", user_id);

    let mut send_task = tokio::spawn(async move {
        loop {
            let message = match rx.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("live messages for user {} skipped {}", user_id, skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(text) = live_frame(&message, user_id) else {
                continue;
            };
            if sender.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // incoming frames are ignored; a close or error ends the session
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            if matches!(frame, WsMessage::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    debug!("user {} disconnected from live messages", user_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender_id: i64, receiver_id: i64) -> Message {
        Message {
            id: 1,
            sender_id,
            receiver_id,
            content: "See you at the library".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            read: false,
            message_type: None,
        }
    }

    #[test]
    fn test_live_frame_only_for_participants() {
        let between_others = message(2, 3);
        assert_eq!(live_frame(&between_others, 1), None);

        let sent = live_frame(&message(1, 2), 1).expect("sender gets the frame");
        let parsed: Message = serde_json::from_str(&sent).expect("frame is a message");
        assert_eq!(parsed, message(1, 2));

        let received = live_frame(&message(2, 1), 1).expect("receiver gets the frame");
        let parsed: Message = serde_json::from_str(&received).expect("frame is a message");
        assert_eq!(parsed, message(2, 1));
    }
}
