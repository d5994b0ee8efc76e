use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::quizzes::{self, NewAttempt};
use crate::error::AppError;
use crate::models::{AttemptAnswer, Question, QuizAttempt, SubmitAttemptRequest, SubmittedAnswer};

/// Grades a submission against the quiz's question bank.
///
/// Every question gets exactly one graded answer, in question order. A
/// question with no submitted answer, or a selected index outside its
/// options, is incorrect. The score is the rounded percentage of correct
/// answers; an empty quiz scores 0.
pub fn grade(questions: &[Question], submitted: &[SubmittedAnswer]) -> (i64, Vec<AttemptAnswer>) {
    let graded: Vec<AttemptAnswer> = questions
        .iter()
        .map(|q| {
            let selected_option = submitted
                .iter()
                .find(|a| a.question_id == q.id)
                .and_then(|a| a.selected_option)
                .filter(|&i| i >= 0 && (i as usize) < q.options.len());

            AttemptAnswer {
                question_id: q.id,
                selected_option,
                is_correct: selected_option == Some(q.correct_option),
            }
        })
        .collect();

    if graded.is_empty() {
        return (0, graded);
    }

    let correct = graded.iter().filter(|a| a.is_correct).count();
    let score = (correct as f64 / graded.len() as f64 * 100.0).round() as i64;
    (score, graded)
}

/// Without a client-supplied start, the attempt is assumed to have used the
/// whole time limit. Limits that are negative or too large to subtract start
/// the attempt at `end`.
pub fn attempt_start(end: DateTime<Utc>, time_limit_minutes: i64, supplied: Option<String>) -> String {
    supplied.unwrap_or_else(|| {
        Duration::try_minutes(time_limit_minutes.max(0))
            .and_then(|limit| end.checked_sub_signed(limit))
            .unwrap_or(end)
            .to_rfc3339()
    })
}

/// Grades the submission against the stored quiz and records the attempt.
/// The quiz itself is left untouched.
pub async fn submit_attempt(
    db: &SqlitePool,
    quiz_id: i64,
    req: SubmitAttemptRequest,
) -> Result<QuizAttempt, AppError> {
    let quiz = quizzes::find_quiz_by_id(db, quiz_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let (score, answers) = grade(&quiz.questions, &req.answers);
    let end = Utc::now();

    let attempt = quizzes::insert_attempt(
        db,
        NewAttempt {
            user_id: req.user_id,
            quiz_id,
            start_time: attempt_start(end, quiz.time_limit, req.start_time),
            end_time: end.to_rfc3339(),
            score,
            answers,
        },
    )
    .await?;

    info!("user {} scored {} on quiz {}", req.user_id, score, quiz_id);
    Ok(attempt)
}
