use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{ChatEntry, ChatRole};

const CHAT_COLUMNS: &str = "id, user_id, role, content, timestamp";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatFilter {
    pub user_id: Option<i64>,
}

pub async fn fetch_history(db: &SqlitePool, filter: &ChatFilter) -> Result<Vec<ChatEntry>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM chat_history", CHAT_COLUMNS));
    if let Some(user_id) = filter.user_id {
        qb.push(" WHERE user_id = ").push_bind(user_id);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<ChatEntry>().fetch_all(db).await
}

/// The newest `limit` entries, oldest first.
pub async fn fetch_recent_history(
    db: &SqlitePool,
    user_id: Option<i64>,
    limit: i64,
) -> Result<Vec<ChatEntry>, sqlx::Error> {
    let mut entries = sqlx::query_as::<_, ChatEntry>(&format!(
        "SELECT {} FROM chat_history WHERE user_id IS ?1 ORDER BY id DESC LIMIT ?2",
        CHAT_COLUMNS
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;

    entries.reverse();
    Ok(entries)
}

pub async fn find_entry_by_id(db: &SqlitePool, id: i64) -> Result<Option<ChatEntry>, sqlx::Error> {
    sqlx::query_as::<_, ChatEntry>(&format!(
        "SELECT {} FROM chat_history WHERE id = ?",
        CHAT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_entry(
    db: &SqlitePool,
    user_id: Option<i64>,
    role: ChatRole,
    content: &str,
) -> Result<ChatEntry, sqlx::Error> {
    let id = sqlx::query(
        "INSERT INTO chat_history (user_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(user_id)
    .bind(role)
    .bind(content)
    .bind(now())
    .execute(db)
    .await?
    .last_insert_rowid();

    find_entry_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn clear_history(db: &SqlitePool, user_id: Option<i64>) -> Result<u64, sqlx::Error> {
    let result = match user_id {
        Some(user_id) => {
            sqlx::query("DELETE FROM chat_history WHERE user_id = ?")
                .bind(user_id)
                .execute(db)
                .await?
        }
        None => sqlx::query("DELETE FROM chat_history").execute(db).await?,
    };

    Ok(result.rows_affected())
}
