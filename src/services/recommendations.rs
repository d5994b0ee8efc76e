use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::db::enrollments::{self, EnrollmentFilter};
use crate::db::flashcards::{self, FlashcardFilter};
use crate::db::quizzes::{self, AttemptFilter};
use crate::db::tasks::{self, TaskFilter};
use crate::error::AppError;
use crate::models::{
    Enrollment, EnrollmentStatus, Flashcard, Priority, QuizAttempt, Recommendation,
    RecommendationKind, Task, TaskStatus,
};
use crate::services::parse_timestamp;
use crate::services::scheduling::is_due;

const TASK_HORIZON_DAYS: i64 = 3;
const LOW_COMPLETION_PERCENT: i64 = 50;
const LOW_SCORE_PERCENT: i64 = 60;

/// Everything the recommender looks at for one user.
#[derive(Debug, Default)]
pub struct StudySnapshot {
    pub flashcards: Vec<Flashcard>,
    pub tasks: Vec<Task>,
    pub enrollments: Vec<Enrollment>,
    pub attempts: Vec<QuizAttempt>,
}

pub async fn recommendations_for_user(
    db: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Recommendation>, AppError> {
    let snapshot = StudySnapshot {
        flashcards: flashcards::fetch_flashcards(
            db,
            &FlashcardFilter {
                user_id: Some(user_id),
                ..Default::default()
            },
        )
        .await?,
        tasks: tasks::fetch_tasks(
            db,
            &TaskFilter {
                user_id: Some(user_id),
                status: Some(TaskStatus::Pending),
                ..Default::default()
            },
        )
        .await?,
        enrollments: enrollments::fetch_enrollments(
            db,
            &EnrollmentFilter {
                user_id: Some(user_id),
                ..Default::default()
            },
        )
        .await?,
        attempts: quizzes::fetch_attempts(
            db,
            &AttemptFilter {
                user_id: Some(user_id),
                ..Default::default()
            },
        )
        .await?,
    };

    Ok(recommend(&snapshot, Utc::now()))
}

/// Builds the list ordered from high to low priority. Ids are 1-based
/// positions in the returned list.
pub fn recommend(snapshot: &StudySnapshot, now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut items: Vec<(Priority, String, String, RecommendationKind)> = Vec::new();

    let due_cards = snapshot.flashcards.iter().filter(|c| is_due(c, now)).count();
    if due_cards > 0 {
        items.push((
            Priority::High,
            "Review your flashcards".to_string(),
            format!("{} flashcard(s) are due for review.", due_cards),
            RecommendationKind::Review,
        ));
    }

    let horizon = now + Duration::days(TASK_HORIZON_DAYS);
    for task in snapshot.tasks.iter().filter(|t| t.status == TaskStatus::Pending) {
        let Some(due) = parse_timestamp(&task.due_date) else {
            continue;
        };
        if due > horizon {
            continue;
        }
        let (priority, description) = if due < now {
            (Priority::High, format!("\"{}\" is overdue.", task.title))
        } else {
            (Priority::Medium, format!("\"{}\" is due on {}.", task.title, task.due_date))
        };
        items.push((
            priority,
            format!("Finish: {}", task.title),
            description,
            RecommendationKind::Practice,
        ));
    }

    for enrollment in snapshot
        .enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Active)
        .filter(|e| e.completion_percentage < LOW_COMPLETION_PERCENT)
    {
        items.push((
            Priority::Medium,
            "Keep going with your course".to_string(),
            format!(
                "Course {} is {}% complete. Pick up the next lesson.",
                enrollment.course_id, enrollment.completion_percentage
            ),
            RecommendationKind::Resource,
        ));
    }

    for attempt in snapshot.attempts.iter().filter(|a| a.score < LOW_SCORE_PERCENT) {
        items.push((
            Priority::Low,
            "Retake a quiz".to_string(),
            format!(
                "You scored {}% on quiz {}. Another attempt will help it stick.",
                attempt.score, attempt.quiz_id
            ),
            RecommendationKind::Practice,
        ));
    }

    if items.is_empty() {
        items.push((
            Priority::Low,
            "Explore new courses".to_string(),
            "You're all caught up. Browse the catalog for something new.".to_string(),
            RecommendationKind::Resource,
        ));
    }

    // stable: keeps the category order within a priority level
    items.sort_by_key(|(priority, ..)| *priority);

    items
        .into_iter()
        .enumerate()
        .map(|(i, (priority, title, description, kind))| Recommendation {
            id: i as i64 + 1,
            title,
            description,
            kind,
            priority,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;
    use sqlx::types::Json;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2026-05-10T12:00:00Z").expect("valid timestamp")
    }

    fn task(title: &str, due: &str) -> Task {
        Task {
            id: 1,
            user_id: 1,
            session_id: None,
            title: title.to_string(),
            description: String::new(),
            due_date: due.to_string(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn card(next_review: Option<&str>) -> Flashcard {
        Flashcard {
            id: 1,
            user_id: 1,
            subject: String::new(),
            question: String::new(),
            answer: String::new(),
            last_reviewed: None,
            next_review: next_review.map(str::to_string),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_nothing_to_do() {
        let recs = recommend(&StudySnapshot::default(), now());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Resource);
        assert_eq!(recs[0].priority, Priority::Low);
        assert_eq!(recs[0].id, 1);
    }

    #[test]
    fn test_priorities_are_ordered() {
        let snapshot = StudySnapshot {
            flashcards: vec![card(None), card(Some("2026-06-01T00:00:00Z"))],
            tasks: vec![
                task("Essay", "2026-05-12"),
                task("Lab report", "2026-05-01"),
                task("Far away", "2026-07-01"),
            ],
            enrollments: vec![Enrollment {
                id: 1,
                user_id: 1,
                course_id: 3,
                enrollment_date: String::new(),
                status: EnrollmentStatus::Active,
                completion_percentage: 20,
                last_accessed: None,
            }],
            attempts: vec![QuizAttempt {
                id: 1,
                user_id: 1,
                quiz_id: 2,
                start_time: String::new(),
                end_time: String::new(),
                score: 40,
                answers: Json(Vec::new()),
            }],
        };

        let recs = recommend(&snapshot, now());
        let kinds: Vec<_> = recs.iter().map(|r| (r.priority, r.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (Priority::High, RecommendationKind::Review),
                (Priority::High, RecommendationKind::Practice),
                (Priority::Medium, RecommendationKind::Practice),
                (Priority::Medium, RecommendationKind::Resource),
                (Priority::Low, RecommendationKind::Practice),
            ]
        );
        assert!(recs[0].description.starts_with("1 flashcard"));
        assert!(recs[1].title.contains("Lab report"));
        let ids: Vec<_> = recs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
