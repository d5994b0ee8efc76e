use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{Flashcard, NewFlashcardRequest, UpdateFlashcardRequest};

const FLASHCARD_COLUMNS: &str =
    "id, user_id, subject, question, answer, last_reviewed, next_review, created_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardFilter {
    pub user_id: Option<i64>,
    pub subject: Option<String>,
    /// Only cards that are due for review now.
    #[serde(default)]
    pub due: bool,
}

pub async fn fetch_flashcards(
    db: &SqlitePool,
    filter: &FlashcardFilter,
) -> Result<Vec<Flashcard>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM flashcards WHERE 1 = 1",
        FLASHCARD_COLUMNS
    ));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(subject) = &filter.subject {
        qb.push(" AND subject = ").push_bind(subject.clone());
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Flashcard>().fetch_all(db).await
}

pub async fn find_flashcard_by_id(db: &SqlitePool, id: i64) -> Result<Option<Flashcard>, sqlx::Error> {
    sqlx::query_as::<_, Flashcard>(&format!(
        "SELECT {} FROM flashcards WHERE id = ?",
        FLASHCARD_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_flashcard(
    db: &SqlitePool,
    req: NewFlashcardRequest,
) -> Result<Flashcard, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO flashcards
            (user_id, subject, question, answer, last_reviewed, next_review, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(req.user_id)
    .bind(&req.subject)
    .bind(&req.question)
    .bind(&req.answer)
    .bind(&req.last_reviewed)
    .bind(&req.next_review)
    .bind(now())
    .execute(db)
    .await?
    .last_insert_rowid();

    find_flashcard_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_flashcard(
    db: &SqlitePool,
    id: i64,
    req: UpdateFlashcardRequest,
) -> Result<Option<Flashcard>, sqlx::Error> {
    let mut current = match find_flashcard_by_id(db, id).await? {
        Some(f) => f,
        None => return Ok(None),
    };

    if let Some(subject) = req.subject {
        current.subject = subject;
    }
    if let Some(question) = req.question {
        current.question = question;
    }
    if let Some(answer) = req.answer {
        current.answer = answer;
    }
    if let Some(last_reviewed) = req.last_reviewed {
        current.last_reviewed = Some(last_reviewed);
    }
    if let Some(next_review) = req.next_review {
        current.next_review = Some(next_review);
    }

    sqlx::query(
        r#"
        UPDATE flashcards
        SET subject = ?1,
            question = ?2,
            answer = ?3,
            last_reviewed = ?4,
            next_review = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.subject)
    .bind(&current.question)
    .bind(&current.answer)
    .bind(&current.last_reviewed)
    .bind(&current.next_review)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_flashcard(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM flashcards WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
