//! Read-only summaries computed from stored records.

use serde::{Deserialize, Serialize};

use crate::models::EnrollmentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Resource,
    Practice,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: String,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyStreak {
    pub user_id: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_study_date: Option<String>,
    pub total_study_minutes: i64,
    pub weekly_minutes: i64,
    pub weekly_goal_minutes: i64,
    pub weekly_progress_percent: i64,
    pub history: Vec<DayTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: i64,
    pub title: String,
    pub progress: i64,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    pub last_accessed: Option<String>,
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_study_minutes: i64,
    pub completed_courses: i64,
    pub in_progress_courses: i64,
    pub average_score: i64,
    pub streak_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub user_id: i64,
    pub courses: Vec<CourseProgress>,
    pub stats: StudyStats,
}
