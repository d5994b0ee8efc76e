pub mod chat;
pub mod courses;
pub mod enrollments;
pub mod flashcards;
pub mod goals;
pub mod messages;
pub mod notes;
pub mod quizzes;
pub mod sessions;
pub mod tasks;
pub mod users;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::error::AppError;

/// Connects to the database, creating the file if needed, and applies
/// pending migrations.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if database_url.contains(":memory:") {
        // every connection to :memory: is its own database
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    debug!("database ready at {}", database_url);

    Ok(pool)
}

pub async fn init_memory_pool() -> Result<SqlitePool, AppError> {
    init_pool("sqlite::memory:", 1).await
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
