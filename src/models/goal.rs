use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudyGoal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub target_date: String,
    pub status: GoalStatus,
    pub progress: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudyGoalRequest {
    pub user_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_date: String,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub progress: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStudyGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<GoalStatus>,
    pub progress: Option<i64>,
}
