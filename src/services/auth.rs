//! Registration and login against the users table.
//!
//! There are no tokens or server-side sessions: a successful call returns
//! the user record and the client keeps it as its signed-in marker.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::db::users::{self, NewUser};
use crate::error::AppError;
use crate::models::{LoginRequest, RegisterRequest, User, UserRole};

const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("password hashing failed: {}", e);
            AppError::InternalServerError
        })
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn avatar_url(name: &str) -> String {
    reqwest::Url::parse_with_params(AVATAR_BASE_URL, &[("name", name)])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| AVATAR_BASE_URL.to_string())
}

pub async fn register(db: &SqlitePool, req: RegisterRequest) -> Result<User, AppError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }
    if req.username.trim().is_empty() || req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Username and name are required".to_string()));
    }

    if users::find_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let avatar = avatar_url(&req.name);
    // a concurrent registration can still win between the check and here
    let user = users::insert_user(
        db,
        NewUser {
            username: req.username,
            email,
            password_hash: hash_password(&req.password)?,
            name: req.name,
            role: UserRole::Student,
            avatar: Some(avatar.clone()),
        },
    )
    .await
    .map_err(duplicate_email_as_conflict)?;

    users::insert_default_profile(db, user.id, &avatar).await?;
    info!("registered user {}", user.id);

    Ok(user)
}

fn duplicate_email_as_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict("Email is already registered".to_string());
        }
    }
    AppError::Database(e)
}

pub async fn login(db: &SqlitePool, req: LoginRequest) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = req.email.trim().to_lowercase();
    let user = users::find_user_by_email(db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        warn!("failed login for user {}", user.id);
        return Err(invalid());
    }

    users::touch_last_login(db, user.id)
        .await?
        .ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "mina".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            name: "Mina Park".to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").expect("Failed to hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-hash"));
    }

    #[test]
    fn test_avatar_url_encodes_name() {
        let url = avatar_url("Mina Park");
        assert!(url.starts_with("https://ui-avatars.com/api/?name="));
        assert!(!url.contains(' '));
    }

    #[tokio::test]
    async fn test_register_creates_profile() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        let user = register(&pool, registration("Mina@Example.com"))
            .await
            .expect("Failed to register");
        assert_eq!(user.email, "mina@example.com");
        assert_eq!(user.role, UserRole::Student);

        let profiles = users::fetch_profiles(&pool, Some(user.id))
            .await
            .expect("Failed to fetch profiles");
        assert_eq!(profiles.len(), 1);
        assert_eq!(Some(profiles[0].avatar_url.clone()), user.avatar);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let pool = init_memory_pool().await.expect("Failed to create test db");

        register(&pool, registration("mina@example.com"))
            .await
            .expect("Failed to register");
        let err = register(&pool, registration("mina@example.com"))
            .await
            .expect_err("Duplicate registration should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let pool = init_memory_pool().await.expect("Failed to create test db");
        let new_user = || NewUser {
            username: "mina".to_string(),
            email: "mina@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: "Mina Park".to_string(),
            role: UserRole::Student,
            avatar: None,
        };

        users::insert_user(&pool, new_user())
            .await
            .expect("Failed to insert user");
        // skips the lookup, like a registration that raced past it
        let err = users::insert_user(&pool, new_user())
            .await
            .expect_err("Duplicate email should violate the unique index");
        assert!(matches!(duplicate_email_as_conflict(err), AppError::Conflict(_)));

        let other = duplicate_email_as_conflict(sqlx::Error::RowNotFound);
        assert!(matches!(other, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let pool = init_memory_pool().await.expect("Failed to create test db");
        register(&pool, registration("mina@example.com"))
            .await
            .expect("Failed to register");

        let user = login(
            &pool,
            LoginRequest {
                email: "mina@example.com".to_string(),
                password: "correct horse".to_string(),
            },
        )
        .await
        .expect("Login should succeed");
        assert!(user.last_login.is_some());

        let wrong_password = login(
            &pool,
            LoginRequest {
                email: "mina@example.com".to_string(),
                password: "battery staple".to_string(),
            },
        )
        .await;
        assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

        let unknown = login(
            &pool,
            LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "correct horse".to_string(),
            },
        )
        .await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }
}
