use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{NewStudySessionRequest, SessionStatus, StudySession, UpdateStudySessionRequest};

const SESSION_COLUMNS: &str = "id, user_id, course_id, subject, topic, start_time, end_time, \
    duration, status, notes, productivity_rating";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    pub user_id: Option<i64>,
    pub status: Option<SessionStatus>,
}

pub async fn fetch_sessions(
    db: &SqlitePool,
    filter: &SessionFilter,
) -> Result<Vec<StudySession>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM study_sessions WHERE 1 = 1",
        SESSION_COLUMNS
    ));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY start_time, id");

    qb.build_query_as::<StudySession>().fetch_all(db).await
}

pub async fn find_session_by_id(db: &SqlitePool, id: i64) -> Result<Option<StudySession>, sqlx::Error> {
    sqlx::query_as::<_, StudySession>(&format!(
        "SELECT {} FROM study_sessions WHERE id = ?",
        SESSION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_session(
    db: &SqlitePool,
    req: NewStudySessionRequest,
) -> Result<StudySession, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO study_sessions
            (user_id, course_id, subject, topic, start_time, end_time,
            duration, status, notes, productivity_rating)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(req.user_id)
    .bind(req.course_id)
    .bind(&req.subject)
    .bind(&req.topic)
    .bind(&req.start_time)
    .bind(&req.end_time)
    .bind(req.duration)
    .bind(req.status)
    .bind(&req.notes)
    .bind(req.productivity_rating)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_session_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_session(
    db: &SqlitePool,
    id: i64,
    req: UpdateStudySessionRequest,
) -> Result<Option<StudySession>, sqlx::Error> {
    let mut current = match find_session_by_id(db, id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(course_id) = req.course_id {
        current.course_id = Some(course_id);
    }
    if let Some(subject) = req.subject {
        current.subject = subject;
    }
    if let Some(topic) = req.topic {
        current.topic = topic;
    }
    if let Some(start_time) = req.start_time {
        current.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        current.end_time = end_time;
    }
    if let Some(duration) = req.duration {
        current.duration = duration;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(notes) = req.notes {
        current.notes = Some(notes);
    }
    if let Some(rating) = req.productivity_rating {
        current.productivity_rating = Some(rating);
    }

    sqlx::query(
        r#"
        UPDATE study_sessions
        SET course_id = ?1,
            subject = ?2,
            topic = ?3,
            start_time = ?4,
            end_time = ?5,
            duration = ?6,
            status = ?7,
            notes = ?8,
            productivity_rating = ?9
        WHERE id = ?10
        "#,
    )
    .bind(current.course_id)
    .bind(&current.subject)
    .bind(&current.topic)
    .bind(&current.start_time)
    .bind(&current.end_time)
    .bind(current.duration)
    .bind(current.status)
    .bind(&current.notes)
    .bind(current.productivity_rating)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_session(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM study_sessions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
