use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{Course, CourseStatus, NewCourseRequest, UpdateCourseRequest};

const COURSE_COLUMNS: &str = "id, title, description, instructor_id, instructor, duration, \
    progress, total_lessons, completed_lessons, image_url, status, category, syllabus, \
    prerequisites, tags, created_at";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub instructor_id: Option<i64>,
    pub status: Option<CourseStatus>,
}

pub async fn fetch_courses(db: &SqlitePool, filter: &CourseFilter) -> Result<Vec<Course>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM courses WHERE 1 = 1", COURSE_COLUMNS));
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(instructor_id) = filter.instructor_id {
        qb.push(" AND instructor_id = ").push_bind(instructor_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<Course>().fetch_all(db).await
}

pub async fn find_course_by_id(db: &SqlitePool, id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourseRequest) -> Result<Course, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO courses
            (title, description, instructor_id, instructor, duration, progress,
            total_lessons, completed_lessons, image_url, status, category,
            syllabus, prerequisites, tags, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.instructor_id)
    .bind(&req.instructor)
    .bind(&req.duration)
    .bind(req.progress)
    .bind(req.total_lessons)
    .bind(req.completed_lessons)
    .bind(&req.image_url)
    .bind(req.status)
    .bind(&req.category)
    .bind(Json(&req.syllabus))
    .bind(Json(&req.prerequisites))
    .bind(Json(&req.tags))
    .bind(now())
    .execute(db)
    .await?
    .last_insert_rowid();

    find_course_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_course(
    db: &SqlitePool,
    id: i64,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(title) = req.title {
        current.title = title;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(instructor_id) = req.instructor_id {
        current.instructor_id = Some(instructor_id);
    }
    if let Some(instructor) = req.instructor {
        current.instructor = instructor;
    }
    if let Some(duration) = req.duration {
        current.duration = duration;
    }
    if let Some(progress) = req.progress {
        current.progress = progress;
    }
    if let Some(total_lessons) = req.total_lessons {
        current.total_lessons = total_lessons;
    }
    if let Some(completed_lessons) = req.completed_lessons {
        current.completed_lessons = completed_lessons;
    }
    if let Some(image_url) = req.image_url {
        current.image_url = image_url;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(category) = req.category {
        current.category = category;
    }
    if let Some(syllabus) = req.syllabus {
        current.syllabus = Json(syllabus);
    }
    if let Some(prerequisites) = req.prerequisites {
        current.prerequisites = Json(prerequisites);
    }
    if let Some(tags) = req.tags {
        current.tags = Json(tags);
    }

    sqlx::query(
        r#"
        UPDATE courses
        SET title = ?1,
            description = ?2,
            instructor_id = ?3,
            instructor = ?4,
            duration = ?5,
            progress = ?6,
            total_lessons = ?7,
            completed_lessons = ?8,
            image_url = ?9,
            status = ?10,
            category = ?11,
            syllabus = ?12,
            prerequisites = ?13,
            tags = ?14
        WHERE id = ?15
        "#,
    )
    .bind(&current.title)
    .bind(&current.description)
    .bind(current.instructor_id)
    .bind(&current.instructor)
    .bind(&current.duration)
    .bind(current.progress)
    .bind(current.total_lessons)
    .bind(current.completed_lessons)
    .bind(&current.image_url)
    .bind(current.status)
    .bind(&current.category)
    .bind(&current.syllabus)
    .bind(&current.prerequisites)
    .bind(&current.tags)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_course(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
