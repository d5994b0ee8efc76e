use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{NewNoteRequest, Note, UpdateNoteRequest};

const NOTE_COLUMNS: &str = "id, user_id, session_id, title, content, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    pub user_id: Option<i64>,
    pub session_id: Option<i64>,
}

pub async fn fetch_notes(db: &SqlitePool, filter: &NoteFilter) -> Result<Vec<Note>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM notes WHERE 1 = 1", NOTE_COLUMNS));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(session_id) = filter.session_id {
        qb.push(" AND session_id = ").push_bind(session_id);
    }
    qb.push(" ORDER BY updated_at DESC, id DESC");

    qb.build_query_as::<Note>().fetch_all(db).await
}

pub async fn find_note_by_id(db: &SqlitePool, id: i64) -> Result<Option<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_note(db: &SqlitePool, req: NewNoteRequest) -> Result<Note, sqlx::Error> {
    let now = now();
    let id = sqlx::query(
        r#"
        INSERT INTO notes (user_id, session_id, title, content, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        "#,
    )
    .bind(req.user_id)
    .bind(req.session_id)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_note_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_note(
    db: &SqlitePool,
    id: i64,
    req: UpdateNoteRequest,
) -> Result<Option<Note>, sqlx::Error> {
    let mut current = match find_note_by_id(db, id).await? {
        Some(n) => n,
        None => return Ok(None),
    };

    if let Some(session_id) = req.session_id {
        current.session_id = Some(session_id);
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(content) = req.content {
        current.content = content;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE notes
        SET session_id = ?1,
            title = ?2,
            content = ?3,
            updated_at = ?4
        WHERE id = ?5
        "#,
    )
    .bind(current.session_id)
    .bind(&current.title)
    .bind(&current.content)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_note(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
