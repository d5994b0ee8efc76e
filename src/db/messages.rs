use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{Message, NewMessageRequest, UpdateMessageRequest};

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, content, timestamp, read, message_type";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageFilter {
    /// Messages the user sent or received.
    pub user_id: Option<i64>,
    /// With `user_id`, narrows to the conversation between the two.
    pub peer_id: Option<i64>,
}

/// Returned in insertion order.
pub async fn fetch_messages(
    db: &SqlitePool,
    filter: &MessageFilter,
) -> Result<Vec<Message>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM messages WHERE 1 = 1", MESSAGE_COLUMNS));
    match (filter.user_id, filter.peer_id) {
        (Some(user_id), Some(peer_id)) => {
            qb.push(" AND ((sender_id = ")
                .push_bind(user_id)
                .push(" AND receiver_id = ")
                .push_bind(peer_id)
                .push(") OR (sender_id = ")
                .push_bind(peer_id)
                .push(" AND receiver_id = ")
                .push_bind(user_id)
                .push("))");
        }
        (Some(user_id), None) | (None, Some(user_id)) => {
            qb.push(" AND (sender_id = ")
                .push_bind(user_id)
                .push(" OR receiver_id = ")
                .push_bind(user_id)
                .push(")");
        }
        (None, None) => {}
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Message>().fetch_all(db).await
}

pub async fn find_message_by_id(db: &SqlitePool, id: i64) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("SELECT {} FROM messages WHERE id = ?", MESSAGE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_message(db: &SqlitePool, req: NewMessageRequest) -> Result<Message, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO messages (sender_id, receiver_id, content, timestamp, read, message_type)
        VALUES (?1, ?2, ?3, ?4, 0, ?5)
        "#,
    )
    .bind(req.sender_id)
    .bind(req.receiver_id)
    .bind(&req.content)
    .bind(now())
    .bind(&req.message_type)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_message_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_message(
    db: &SqlitePool,
    id: i64,
    req: UpdateMessageRequest,
) -> Result<Option<Message>, sqlx::Error> {
    let mut current = match find_message_by_id(db, id).await? {
        Some(m) => m,
        None => return Ok(None),
    };

    if let Some(read) = req.read {
        current.read = read;
    }
    if let Some(content) = req.content {
        current.content = content;
    }

    sqlx::query("UPDATE messages SET read = ?1, content = ?2 WHERE id = ?3")
        .bind(current.read)
        .bind(&current.content)
        .bind(id)
        .execute(db)
        .await?;

    Ok(Some(current))
}

/// Marks everything `peer_id` sent to `user_id` as read. Returns how many
/// messages changed.
pub async fn mark_conversation_read(
    db: &SqlitePool,
    user_id: i64,
    peer_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE messages SET read = 1 WHERE receiver_id = ?1 AND sender_id = ?2 AND read = 0",
    )
    .bind(user_id)
    .bind(peer_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_message(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
