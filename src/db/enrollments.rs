use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{Enrollment, NewEnrollmentRequest, UpdateEnrollmentRequest};

const ENROLLMENT_COLUMNS: &str =
    "id, user_id, course_id, enrollment_date, status, completion_percentage, last_accessed";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollmentFilter {
    pub user_id: Option<i64>,
    pub course_id: Option<i64>,
}

pub async fn fetch_enrollments(
    db: &SqlitePool,
    filter: &EnrollmentFilter,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM enrollments WHERE 1 = 1",
        ENROLLMENT_COLUMNS
    ));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(course_id) = filter.course_id {
        qb.push(" AND course_id = ").push_bind(course_id);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Enrollment>().fetch_all(db).await
}

pub async fn find_enrollment_by_id(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {} FROM enrollments WHERE id = ?",
        ENROLLMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_enrollment(
    db: &SqlitePool,
    req: NewEnrollmentRequest,
) -> Result<Enrollment, sqlx::Error> {
    let enrollment_date = req.enrollment_date.unwrap_or_else(now);
    let id = sqlx::query(
        r#"
        INSERT INTO enrollments
            (user_id, course_id, enrollment_date, status, completion_percentage, last_accessed)
        VALUES (?1, ?2, ?3, ?4, ?5, NULL)
        "#,
    )
    .bind(req.user_id)
    .bind(req.course_id)
    .bind(&enrollment_date)
    .bind(req.status)
    .bind(req.completion_percentage)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_enrollment_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_enrollment(
    db: &SqlitePool,
    id: i64,
    req: UpdateEnrollmentRequest,
) -> Result<Option<Enrollment>, sqlx::Error> {
    let mut current = match find_enrollment_by_id(db, id).await? {
        Some(e) => e,
        None => return Ok(None),
    };

    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(pct) = req.completion_percentage {
        current.completion_percentage = pct;
    }
    current.last_accessed = Some(req.last_accessed.unwrap_or_else(now));

    sqlx::query(
        r#"
        UPDATE enrollments
        SET status = ?1,
            completion_percentage = ?2,
            last_accessed = ?3
        WHERE id = ?4
        "#,
    )
    .bind(current.status)
    .bind(current.completion_percentage)
    .bind(&current.last_accessed)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_enrollment(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
