use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::courses::{self, CourseFilter};
use crate::db::enrollments::{self, EnrollmentFilter};
use crate::db::quizzes::{self, AttemptFilter};
use crate::db::sessions::{self, SessionFilter};
use crate::error::AppError;
use crate::models::{
    Course, CourseProgress, Enrollment, EnrollmentStatus, ProgressReport, QuizAttempt,
    SessionStatus, StudySession, StudyStats,
};
use crate::services::streaks::compute_streak;

pub async fn progress_for_user(db: &SqlitePool, user_id: i64) -> Result<ProgressReport, AppError> {
    let enrollments = enrollments::fetch_enrollments(
        db,
        &EnrollmentFilter {
            user_id: Some(user_id),
            ..Default::default()
        },
    )
    .await?;
    let courses = courses::fetch_courses(db, &CourseFilter::default()).await?;
    let sessions = sessions::fetch_sessions(
        db,
        &SessionFilter {
            user_id: Some(user_id),
            status: Some(SessionStatus::Completed),
        },
    )
    .await?;
    let attempts = quizzes::fetch_attempts(
        db,
        &AttemptFilter {
            user_id: Some(user_id),
            ..Default::default()
        },
    )
    .await?;

    Ok(compute_progress(
        user_id,
        &enrollments,
        &courses,
        &sessions,
        &attempts,
        Utc::now().date_naive(),
    ))
}

/// Enrollments whose course no longer exists are left out of the course list
/// but still count toward the enrollment totals.
pub fn compute_progress(
    user_id: i64,
    enrollments: &[Enrollment],
    courses: &[Course],
    sessions: &[StudySession],
    attempts: &[QuizAttempt],
    today: NaiveDate,
) -> ProgressReport {
    let by_id: HashMap<i64, &Course> = courses.iter().map(|c| (c.id, c)).collect();

    let course_progress = enrollments
        .iter()
        .filter_map(|e| {
            let Some(course) = by_id.get(&e.course_id) else {
                debug!("enrollment {} points at missing course {}", e.id, e.course_id);
                return None;
            };
            Some(CourseProgress {
                course_id: course.id,
                title: course.title.clone(),
                progress: e.completion_percentage,
                completed_lessons: e
                    .completion_percentage
                    .saturating_mul(course.total_lessons)
                    .div_euclid(100),
                total_lessons: course.total_lessons,
                last_accessed: e.last_accessed.clone(),
                status: e.status,
            })
        })
        .collect();

    let average_score = if attempts.is_empty() {
        0
    } else {
        let total: i64 = attempts.iter().map(|a| a.score).sum();
        (total as f64 / attempts.len() as f64).round() as i64
    };

    let streak = compute_streak(user_id, sessions, today);

    ProgressReport {
        user_id,
        courses: course_progress,
        stats: StudyStats {
            total_study_minutes: streak.total_study_minutes,
            completed_courses: count_status(enrollments, EnrollmentStatus::Completed),
            in_progress_courses: count_status(enrollments, EnrollmentStatus::Active),
            average_score,
            streak_days: streak.current_streak,
        },
    }
}

fn count_status(enrollments: &[Enrollment], status: EnrollmentStatus) -> i64 {
    enrollments.iter().filter(|e| e.status == status).count() as i64
}
