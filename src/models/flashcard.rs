use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: i64,
    pub user_id: i64,
    pub subject: String,
    pub question: String,
    pub answer: String,
    pub last_reviewed: Option<String>,
    pub next_review: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlashcardRequest {
    pub user_id: i64,
    #[serde(default)]
    pub subject: String,
    pub question: String,
    pub answer: String,
    pub last_reviewed: Option<String>,
    pub next_review: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlashcardRequest {
    pub subject: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub last_reviewed: Option<String>,
    pub next_review: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFlashcardRequest {
    pub remembered: bool,
}
