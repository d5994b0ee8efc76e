use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_option: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub course_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub total_questions: i64,
    /// Minutes.
    pub time_limit: i64,
    pub difficulty: String,
    pub status: String,
    pub questions: Json<Vec<Question>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub question_id: i64,
    pub selected_option: Option<i64>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub score: i64,
    pub answers: Json<Vec<AttemptAnswer>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewQuizRequest {
    pub course_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub time_limit: Option<i64>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQuizRequest {
    pub course_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_limit: Option<i64>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub questions: Option<Vec<Question>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    /// `None` or a negative index means the question was skipped.
    pub selected_option: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptRequest {
    pub user_id: i64,
    pub start_time: Option<String>,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}
