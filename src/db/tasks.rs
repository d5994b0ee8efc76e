use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{NewTaskRequest, Task, TaskStatus, UpdateTaskRequest};

const TASK_COLUMNS: &str = "id, user_id, session_id, title, description, due_date, priority, \
    status, created_at, updated_at";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub user_id: Option<i64>,
    pub session_id: Option<i64>,
    pub status: Option<TaskStatus>,
}

pub async fn fetch_tasks(db: &SqlitePool, filter: &TaskFilter) -> Result<Vec<Task>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM tasks WHERE 1 = 1", TASK_COLUMNS));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(session_id) = filter.session_id {
        qb.push(" AND session_id = ").push_bind(session_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY due_date, id");

    qb.build_query_as::<Task>().fetch_all(db).await
}

pub async fn find_task_by_id(db: &SqlitePool, id: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_task(db: &SqlitePool, req: NewTaskRequest) -> Result<Task, sqlx::Error> {
    let now = now();
    let id = sqlx::query(
        r#"
        INSERT INTO tasks
            (user_id, session_id, title, description, due_date, priority,
            status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(req.user_id)
    .bind(req.session_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.due_date)
    .bind(req.priority)
    .bind(req.status)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_task_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_task(
    db: &SqlitePool,
    id: i64,
    req: UpdateTaskRequest,
) -> Result<Option<Task>, sqlx::Error> {
    let mut current = match find_task_by_id(db, id).await? {
        Some(t) => t,
        None => return Ok(None),
    };

    if let Some(session_id) = req.session_id {
        current.session_id = Some(session_id);
    }
    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(due_date) = req.due_date {
        current.due_date = due_date;
    }
    if let Some(priority) = req.priority {
        current.priority = priority;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    current.updated_at = now();

    sqlx::query(
        r#"
        UPDATE tasks
        SET session_id = ?1,
            title = ?2,
            description = ?3,
            due_date = ?4,
            priority = ?5,
            status = ?6,
            updated_at = ?7
        WHERE id = ?8
        "#,
    )
    .bind(current.session_id)
    .bind(&current.title)
    .bind(&current.description)
    .bind(&current.due_date)
    .bind(current.priority)
    .bind(current.status)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_task(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
