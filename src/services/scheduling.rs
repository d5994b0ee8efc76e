//! Flashcard review scheduling: forgotten cards come back tomorrow,
//! remembered ones wait twice as long as last time.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::flashcards;
use crate::error::AppError;
use crate::models::{Flashcard, UpdateFlashcardRequest};
use crate::services::parse_timestamp;

pub const MAX_INTERVAL_DAYS: i64 = 60;

/// Cards never scheduled, or with an unreadable schedule, are due.
pub fn is_due(card: &Flashcard, now: DateTime<Utc>) -> bool {
    match card.next_review.as_deref().and_then(parse_timestamp) {
        Some(next) => next <= now,
        None => true,
    }
}

fn previous_interval_days(card: &Flashcard) -> i64 {
    let last = card.last_reviewed.as_deref().and_then(parse_timestamp);
    let next = card.next_review.as_deref().and_then(parse_timestamp);
    match (last, next) {
        (Some(last), Some(next)) if next > last => (next - last).num_days(),
        _ => 0,
    }
}

pub fn next_interval_days(card: &Flashcard, remembered: bool) -> i64 {
    if !remembered {
        return 1;
    }
    (previous_interval_days(card) * 2).clamp(1, MAX_INTERVAL_DAYS)
}

pub async fn review_flashcard(
    db: &SqlitePool,
    id: i64,
    remembered: bool,
) -> Result<Flashcard, AppError> {
    let card = flashcards::find_flashcard_by_id(db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let now = Utc::now();
    let interval = next_interval_days(&card, remembered);
    debug!("flashcard {} remembered={} next in {} days", id, remembered, interval);

    flashcards::update_flashcard(
        db,
        id,
        UpdateFlashcardRequest {
            last_reviewed: Some(now.to_rfc3339()),
            next_review: Some((now + Duration::days(interval)).to_rfc3339()),
            ..Default::default()
        },
    )
    .await?
    .ok_or(AppError::NotFound)
}
