use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::now;
use crate::models::{
    NotificationSettings, StudyPreferences, UpdateProfileRequest, UpdateUserRequest, User,
    UserProfile, UserRole,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, name, role, avatar, bio, \
    expertise, subjects, rating, hourly_rate, xp, target_xp, streak_days, created_at, last_login";

const PROFILE_COLUMNS: &str =
    "id, user_id, avatar_url, bio, study_preferences, notification_settings, achievements";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub email: Option<String>,
    /// Matches `subjects` or `expertise`, case-insensitive.
    pub subject: Option<String>,
    pub max_rate: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub avatar: Option<String>,
}

pub async fn fetch_users(db: &SqlitePool, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM users WHERE 1 = 1", USER_COLUMNS));
    if let Some(role) = filter.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(email) = &filter.email {
        // stored lowercased at registration
        qb.push(" AND email = ").push_bind(email.trim().to_lowercase());
    }
    if let Some(max_rate) = filter.max_rate {
        qb.push(" AND hourly_rate IS NOT NULL AND hourly_rate <= ").push_bind(max_rate);
    }
    qb.push(" ORDER BY id");

    let users = qb.build_query_as::<User>().fetch_all(db).await?;

    let Some(subject) = filter.subject.as_ref().map(|s| s.to_lowercase()) else {
        return Ok(users);
    };
    Ok(users
        .into_iter()
        .filter(|u| {
            u.subjects
                .iter()
                .chain(u.expertise.iter())
                .any(|s| s.to_lowercase().contains(&subject))
        })
        .collect())
}

pub async fn find_user_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn insert_user(db: &SqlitePool, user: NewUser) -> Result<User, sqlx::Error> {
    let now = now();
    let id = sqlx::query(
        r#"
        INSERT INTO users
            (username, email, password_hash, name, role, avatar, created_at, last_login)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(user.role)
    .bind(&user.avatar)
    .bind(&now)
    .execute(db)
    .await?
    .last_insert_rowid();

    find_user_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_user(
    db: &SqlitePool,
    id: i64,
    req: UpdateUserRequest,
) -> Result<Option<User>, sqlx::Error> {
    let mut current = match find_user_by_id(db, id).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if let Some(username) = req.username {
        current.username = username;
    }
    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(role) = req.role {
        current.role = role;
    }
    if let Some(avatar) = req.avatar {
        current.avatar = Some(avatar);
    }
    if let Some(bio) = req.bio {
        current.bio = bio;
    }
    if let Some(expertise) = req.expertise {
        current.expertise = Json(expertise);
    }
    if let Some(subjects) = req.subjects {
        current.subjects = Json(subjects);
    }
    if let Some(rating) = req.rating {
        current.rating = Some(rating);
    }
    if let Some(hourly_rate) = req.hourly_rate {
        current.hourly_rate = Some(hourly_rate);
    }
    if let Some(xp) = req.xp {
        current.xp = xp;
    }
    if let Some(target_xp) = req.target_xp {
        current.target_xp = target_xp;
    }
    if let Some(streak_days) = req.streak_days {
        current.streak_days = streak_days;
    }

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?1,
            name = ?2,
            role = ?3,
            avatar = ?4,
            bio = ?5,
            expertise = ?6,
            subjects = ?7,
            rating = ?8,
            hourly_rate = ?9,
            xp = ?10,
            target_xp = ?11,
            streak_days = ?12
        WHERE id = ?13
        "#,
    )
    .bind(&current.username)
    .bind(&current.name)
    .bind(current.role)
    .bind(&current.avatar)
    .bind(&current.bio)
    .bind(&current.expertise)
    .bind(&current.subjects)
    .bind(current.rating)
    .bind(current.hourly_rate)
    .bind(current.xp)
    .bind(current.target_xp)
    .bind(current.streak_days)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn touch_last_login(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let affected = sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
        .bind(now())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Ok(None);
    }
    find_user_by_id(db, id).await
}

pub async fn delete_user(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_profiles(
    db: &SqlitePool,
    user_id: Option<i64>,
) -> Result<Vec<UserProfile>, sqlx::Error> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM user_profiles", PROFILE_COLUMNS));
    if let Some(user_id) = user_id {
        qb.push(" WHERE user_id = ").push_bind(user_id);
    }
    qb.push(" ORDER BY id");

    qb.build_query_as::<UserProfile>().fetch_all(db).await
}

pub async fn find_profile_by_id(db: &SqlitePool, id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {} FROM user_profiles WHERE id = ?",
        PROFILE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_default_profile(
    db: &SqlitePool,
    user_id: i64,
    avatar_url: &str,
) -> Result<UserProfile, sqlx::Error> {
    let id = sqlx::query(
        r#"
        INSERT INTO user_profiles
            (user_id, avatar_url, bio, study_preferences, notification_settings, achievements)
        VALUES (?1, ?2, '', ?3, ?4, '[]')
        "#,
    )
    .bind(user_id)
    .bind(avatar_url)
    .bind(Json(StudyPreferences::default()))
    .bind(Json(NotificationSettings::default()))
    .execute(db)
    .await?
    .last_insert_rowid();

    find_profile_by_id(db, id)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}

pub async fn update_profile(
    db: &SqlitePool,
    id: i64,
    req: UpdateProfileRequest,
) -> Result<Option<UserProfile>, sqlx::Error> {
    let mut current = match find_profile_by_id(db, id).await? {
        Some(p) => p,
        None => return Ok(None),
    };

    if let Some(avatar_url) = req.avatar_url {
        current.avatar_url = avatar_url;
    }
    if let Some(bio) = req.bio {
        current.bio = bio;
    }
    if let Some(prefs) = req.study_preferences {
        current.study_preferences = Json(prefs);
    }
    if let Some(settings) = req.notification_settings {
        current.notification_settings = Json(settings);
    }
    if let Some(achievements) = req.achievements {
        current.achievements = Json(achievements);
    }

    sqlx::query(
        r#"
        UPDATE user_profiles
        SET avatar_url = ?1,
            bio = ?2,
            study_preferences = ?3,
            notification_settings = ?4,
            achievements = ?5
        WHERE id = ?6
        "#,
    )
    .bind(&current.avatar_url)
    .bind(&current.bio)
    .bind(&current.study_preferences)
    .bind(&current.notification_settings)
    .bind(&current.achievements)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            username: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Test User".to_string(),
            role,
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_email_filter_ignores_case() {
        let pool = init_memory_pool().await.expect("Failed to create test db");
        insert_user(&pool, new_user("ada@example.com", UserRole::Student))
            .await
            .expect("Failed to insert user");

        let filter = UserFilter {
            email: Some("Ada@Example.com".to_string()),
            ..Default::default()
        };
        let found = fetch_users(&pool, &filter).await.expect("Failed to query");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        let user = insert_user(&pool, new_user("ana@example.com", UserRole::Student))
            .await
            .expect("Failed to insert user");
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.created_at, user.last_login.clone().unwrap_or_default());

        let found = find_user_by_email(&pool, "ana@example.com")
            .await
            .expect("Failed to query")
            .expect("User not found");
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        insert_user(&pool, new_user("dup@example.com", UserRole::Student))
            .await
            .expect("Failed to insert user");
        let second = insert_user(&pool, new_user("dup@example.com", UserRole::Student)).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_tutor_filters() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        let tutor = insert_user(&pool, new_user("tutor@example.com", UserRole::Tutor))
            .await
            .expect("Failed to insert tutor");
        insert_user(&pool, new_user("student@example.com", UserRole::Student))
            .await
            .expect("Failed to insert student");

        update_user(
            &pool,
            tutor.id,
            UpdateUserRequest {
                subjects: Some(vec!["Calculus".to_string()]),
                hourly_rate: Some(25.0),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update tutor");

        let filter = UserFilter {
            role: Some(UserRole::Tutor),
            subject: Some("calc".to_string()),
            max_rate: Some(30.0),
            ..Default::default()
        };
        let tutors = fetch_users(&pool, &filter).await.expect("Failed to fetch");
        assert_eq!(tutors.len(), 1);
        assert_eq!(tutors[0].id, tutor.id);

        let too_cheap = UserFilter {
            role: Some(UserRole::Tutor),
            max_rate: Some(10.0),
            ..Default::default()
        };
        assert!(fetch_users(&pool, &too_cheap).await.expect("Failed to fetch").is_empty());
    }

    #[tokio::test]
    async fn test_default_profile_round_trip() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        let profile = insert_default_profile(&pool, 7, "https://example.com/a.png")
            .await
            .expect("Failed to insert profile");
        assert_eq!(profile.study_preferences.study_duration, 45);
        assert!(profile.notification_settings.quiz_reminders);

        let updated = update_profile(
            &pool,
            profile.id,
            UpdateProfileRequest {
                bio: Some("Night owl".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update profile")
        .expect("Profile not found");
        assert_eq!(updated.bio, "Night owl");

        let listed = fetch_profiles(&pool, Some(7)).await.expect("Failed to fetch");
        assert_eq!(listed.len(), 1);
        assert!(fetch_profiles(&pool, Some(8)).await.expect("Failed to fetch").is_empty());
    }
}
