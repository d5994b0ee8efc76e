use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllabusWeek {
    pub week: i64,
    pub topic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Progress counters are denormalized and taken as given.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub instructor_id: Option<i64>,
    pub instructor: String,
    pub duration: String,
    pub progress: i64,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub image_url: String,
    pub status: CourseStatus,
    pub category: String,
    pub syllabus: Json<Vec<SyllabusWeek>>,
    pub prerequisites: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub instructor_id: Option<i64>,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub total_lessons: i64,
    #[serde(default)]
    pub completed_lessons: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub syllabus: Vec<SyllabusWeek>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor_id: Option<i64>,
    pub instructor: Option<String>,
    pub duration: Option<String>,
    pub progress: Option<i64>,
    pub total_lessons: Option<i64>,
    pub completed_lessons: Option<i64>,
    pub image_url: Option<String>,
    pub status: Option<CourseStatus>,
    pub category: Option<String>,
    pub syllabus: Option<Vec<SyllabusWeek>>,
    pub prerequisites: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}
