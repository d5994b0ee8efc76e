use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{NewStudyGoalRequest, StudyGoal, UpdateStudyGoalRequest};

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_date, status, progress";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalFilter {
    pub user_id: Option<i64>,
}

pub async fn fetch_goals(db: &SqlitePool, filter: &GoalFilter) -> Result<Vec<StudyGoal>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM study_goals", GOAL_COLUMNS));
    if let Some(user_id) = filter.user_id {
        qb.push(" WHERE user_id = ").push_bind(user_id);
    }
    qb.push(" ORDER BY target_date, id");

    qb.build_query_as::<StudyGoal>().fetch_all(db).await
}

pub async fn find_goal_by_id(db: &SqlitePool, id: i64) -> Result<Option<StudyGoal>, sqlx::Error> {
    sqlx::query_as::<_, StudyGoal>(&format!(
        "SELECT {} FROM study_goals WHERE id = ?",
        GOAL_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_goal(db: &SqlitePool, req: NewStudyGoalRequest) -> Result<StudyGoal, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO study_goals (user_id, title, description, target_date, status, progress)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(req.user_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.target_date)
    .bind(req.status)
    .bind(req.progress)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_goal_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_goal(
    db: &SqlitePool,
    id: i64,
    req: UpdateStudyGoalRequest,
) -> Result<Option<StudyGoal>, sqlx::Error> {
    let mut current = match find_goal_by_id(db, id).await? {
        Some(g) => g,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(target_date) = req.target_date {
        current.target_date = target_date;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(progress) = req.progress {
        current.progress = progress;
    }

    sqlx::query(
        r#"
        UPDATE study_goals
        SET title = ?1,
            description = ?2,
            target_date = ?3,
            status = ?4,
            progress = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.target_date)
    .bind(current.status)
    .bind(current.progress)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_goal(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM study_goals WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
