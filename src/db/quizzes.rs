use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{AttemptAnswer, NewQuizRequest, Quiz, QuizAttempt, UpdateQuizRequest};

const QUIZ_COLUMNS: &str =
    "id, course_id, title, description, total_questions, time_limit, difficulty, status, questions";

const ATTEMPT_COLUMNS: &str = "id, user_id, quiz_id, start_time, end_time, score, answers";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizFilter {
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptFilter {
    pub user_id: Option<i64>,
    pub quiz_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub quiz_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub score: i64,
    pub answers: Vec<AttemptAnswer>,
}

pub async fn fetch_quizzes(db: &SqlitePool, filter: &QuizFilter) -> Result<Vec<Quiz>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM quizzes", QUIZ_COLUMNS));
    if let Some(course_id) = filter.course_id {
        qb.push(" WHERE course_id = ").push_bind(course_id);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Quiz>().fetch_all(db).await
}

pub async fn find_quiz_by_id(db: &SqlitePool, id: i64) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {} FROM quizzes WHERE id = ?", QUIZ_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_quiz(db: &SqlitePool, req: NewQuizRequest) -> Result<Quiz, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO quizzes
            (course_id, title, description, total_questions, time_limit,
            difficulty, status, questions)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(req.course_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.questions.len() as i64)
    .bind(req.time_limit.unwrap_or(10))
    .bind(req.difficulty.as_deref().unwrap_or("medium"))
    .bind(req.status.as_deref().unwrap_or("not_started"))
    .bind(Json(&req.questions))
    .execute(db)
    .await?
    .last_insert_rowid();

    find_quiz_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_quiz(
    db: &SqlitePool,
    id: i64,
    req: UpdateQuizRequest,
) -> Result<Option<Quiz>, sqlx::Error> {
    let mut current = match find_quiz_by_id(db, id).await? {
        Some(q) => q,
        None => return Ok(None),
    };

    if let Some(course_id) = req.course_id {
        current.course_id = Some(course_id);
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(time_limit) = req.time_limit {
        current.time_limit = time_limit;
    }
    if let Some(difficulty) = req.difficulty {
        current.difficulty = difficulty;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(questions) = req.questions {
        current.total_questions = questions.len() as i64;
        current.questions = Json(questions);
    }

    sqlx::query(
        r#"
        UPDATE quizzes
        SET course_id = ?1,
            title = ?2,
            description = ?3,
            total_questions = ?4,
            time_limit = ?5,
            difficulty = ?6,
            status = ?7,
            questions = ?8
        WHERE id = ?9
        "#,
    )
    .bind(current.course_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.total_questions)
    .bind(current.time_limit)
    .bind(&current.difficulty)
    .bind(&current.status)
    .bind(&current.questions)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_quiz(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_attempts(
    db: &SqlitePool,
    filter: &AttemptFilter,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM quiz_attempts WHERE 1 = 1",
        ATTEMPT_COLUMNS
    ));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(quiz_id) = filter.quiz_id {
        qb.push(" AND quiz_id = ").push_bind(quiz_id);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<QuizAttempt>().fetch_all(db).await
}

pub async fn find_attempt_by_id(db: &SqlitePool, id: i64) -> Result<Option<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {} FROM quiz_attempts WHERE id = ?",
        ATTEMPT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_attempt(db: &SqlitePool, attempt: NewAttempt) -> Result<QuizAttempt, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO quiz_attempts
            (user_id, quiz_id, start_time, end_time, score, answers)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(attempt.user_id)
    .bind(attempt.quiz_id)
    .bind(&attempt.start_time)
    .bind(&attempt.end_time)
    .bind(attempt.score)
    .bind(Json(&attempt.answers))
    .execute(db)
    .await?
    .last_insert_rowid();

    find_attempt_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn delete_attempt(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quiz_attempts WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
