use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum SessionStatus {
    Completed,
    InProgress,
    #[default]
    Planned,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: i64,
    pub user_id: i64,
    pub course_id: Option<i64>,
    pub subject: String,
    pub topic: String,
    pub start_time: String,
    pub end_time: String,
    /// Minutes.
    pub duration: i64,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub productivity_rating: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudySessionRequest {
    pub user_id: i64,
    pub course_id: Option<i64>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub productivity_rating: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudySessionRequest {
    pub course_id: Option<i64>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
    pub status: Option<SessionStatus>,
    pub notes: Option<String>,
    pub productivity_rating: Option<i64>,
}
