use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
    Tutor,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub bio: String,
    pub expertise: Json<Vec<String>>,
    pub subjects: Json<Vec<String>>,
    pub rating: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub xp: i64,
    pub target_xp: i64,
    pub streak_days: i64,
    pub created_at: String,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub subjects: Option<Vec<String>>,
    pub rating: Option<f64>,
    pub hourly_rate: Option<f64>,
    pub xp: Option<i64>,
    pub target_xp: Option<i64>,
    pub streak_days: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredStudyTime {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPreferences {
    pub preferred_study_time: PreferredStudyTime,
    pub study_duration: i64,
    pub break_duration: i64,
    pub preferred_subjects: Vec<String>,
}

impl Default for StudyPreferences {
    fn default() -> Self {
        Self {
            preferred_study_time: PreferredStudyTime::Morning,
            study_duration: 45,
            break_duration: 15,
            preferred_subjects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub study_reminders: bool,
    pub quiz_reminders: bool,
    pub course_updates: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            study_reminders: true,
            quiz_reminders: true,
            course_updates: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date_earned: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub avatar_url: String,
    pub bio: String,
    pub study_preferences: Json<StudyPreferences>,
    pub notification_settings: Json<NotificationSettings>,
    pub achievements: Json<Vec<Achievement>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub study_preferences: Option<StudyPreferences>,
    pub notification_settings: Option<NotificationSettings>,
    pub achievements: Option<Vec<Achievement>>,
}
