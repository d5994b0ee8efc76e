use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::db::sessions::{self, SessionFilter};
use crate::error::AppError;
use crate::models::{DayTotal, SessionStatus, StudySession, StudyStreak};
use crate::services::parse_timestamp;

/// 20 hours a week.
pub const WEEKLY_GOAL_MINUTES: i64 = 20 * 60;

pub async fn streak_for_user(db: &SqlitePool, user_id: i64) -> Result<StudyStreak, AppError> {
    let filter = SessionFilter {
        user_id: Some(user_id),
        status: Some(SessionStatus::Completed),
    };
    let sessions = sessions::fetch_sessions(db, &filter).await?;
    Ok(compute_streak(user_id, &sessions, Utc::now().date_naive()))
}

/// Only completed sessions count, bucketed by the UTC day they started.
/// Sessions dated after `today` or with unreadable start times are ignored.
pub fn compute_streak(user_id: i64, sessions: &[StudySession], today: NaiveDate) -> StudyStreak {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for session in sessions.iter().filter(|s| s.status == SessionStatus::Completed) {
        let Some(started) = parse_timestamp(&session.start_time) else {
            continue;
        };
        let day = started.date_naive();
        if day > today {
            continue;
        }
        let total = days.entry(day).or_insert(0);
        *total = total.saturating_add(session.duration.max(0));
    }

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days.keys() {
        run = match previous {
            Some(prev) if *day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    // `run` is the streak ending on the last study day
    let current = match previous {
        Some(last) if today - last <= Duration::days(1) => run,
        _ => 0,
    };

    let week_start = today - Duration::days(6);
    // durations are client-supplied, so totals saturate instead of wrapping
    let weekly_minutes = days
        .range(week_start..)
        .fold(0i64, |acc, (_, minutes)| acc.saturating_add(*minutes));
    let total_study_minutes = days.values().fold(0i64, |acc, m| acc.saturating_add(*m));

    StudyStreak {
        user_id,
        current_streak: current,
        longest_streak: longest,
        last_study_date: previous.map(|d| d.to_string()),
        total_study_minutes,
        weekly_minutes,
        weekly_goal_minutes: WEEKLY_GOAL_MINUTES,
        weekly_progress_percent: (weekly_minutes.saturating_mul(100) / WEEKLY_GOAL_MINUTES).min(100),
        history: days
            .into_iter()
            .map(|(date, duration)| DayTotal {
                date: date.to_string(),
                duration,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn completed(start: &str, minutes: i64) -> StudySession {
        StudySession {
            id: 0,
            user_id: 1,
            course_id: None,
            subject: String::new(),
            topic: String::new(),
            start_time: start.to_string(),
            end_time: start.to_string(),
            duration: minutes,
            status: SessionStatus::Completed,
            notes: None,
            productivity_rating: None,
        }
    }

    #[test]
    fn test_no_sessions() {
        let streak = compute_streak(1, &[], day("2026-04-10"));
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 0);
        assert_eq!(streak.last_study_date, None);
        assert!(streak.history.is_empty());
    }

    #[test]
    fn test_current_streak_ending_yesterday() {
        let sessions = vec![
            completed("2026-04-07T08:00:00Z", 30),
            completed("2026-04-08T08:00:00Z", 45),
            completed("2026-04-09T20:00:00Z", 60),
            completed("2026-04-09T21:30:00Z", 15),
        ];
        let streak = compute_streak(1, &sessions, day("2026-04-10"));

        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.last_study_date.as_deref(), Some("2026-04-09"));
        assert_eq!(streak.history.len(), 3);
        assert_eq!(streak.history[2].duration, 75);
        assert_eq!(streak.total_study_minutes, 150);
    }

    #[test]
    fn test_broken_streak_keeps_longest() {
        let sessions = vec![
            completed("2026-03-01T08:00:00Z", 10),
            completed("2026-03-02T08:00:00Z", 10),
            completed("2026-03-03T08:00:00Z", 10),
            completed("2026-04-01T08:00:00Z", 10),
        ];
        let streak = compute_streak(1, &sessions, day("2026-04-10"));
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 3);
    }

    #[test]
    fn test_weekly_window_and_goal_cap() {
        let sessions = vec![
            completed("2026-04-03T08:00:00Z", 500),
            completed("2026-04-04T08:00:00Z", 900),
            completed("2026-04-10T08:00:00Z", 600),
        ];
        let streak = compute_streak(1, &sessions, day("2026-04-10"));

        // 04-03 is outside the seven days ending 04-10
        assert_eq!(streak.weekly_minutes, 1500);
        assert_eq!(streak.weekly_progress_percent, 100);
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let huge = i64::MAX / 2 + 10;
        let sessions = vec![
            completed("2026-04-10T08:00:00Z", huge),
            completed("2026-04-10T09:00:00Z", huge),
        ];
        let streak = compute_streak(1, &sessions, day("2026-04-10"));

        assert_eq!(streak.history[0].duration, i64::MAX);
        assert_eq!(streak.total_study_minutes, i64::MAX);
        assert_eq!(streak.weekly_minutes, i64::MAX);
        assert_eq!(streak.weekly_progress_percent, 100);
    }

    #[test]
    fn test_ignores_planned_and_unparseable() {
        let mut planned = completed("2026-04-10T08:00:00Z", 60);
        planned.status = SessionStatus::Planned;
        let sessions = vec![planned, completed("someday", 60), completed("2026-04-11T08:00:00Z", 60)];

        let streak = compute_streak(1, &sessions, day("2026-04-10"));
        assert_eq!(streak.total_study_minutes, 0);
        assert_eq!(streak.current_streak, 0);
    }
}
