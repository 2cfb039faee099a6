//! Database module for SQLite persistence.
//!
//! SQLite is the profile store: users, preferences, matches and connections.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Initialize the database connection pool and run migrations.
///
/// `acquire_timeout` bounds how long a request may wait for a connection.
pub async fn init_database(
    db_path: &Path,
    acquire_timeout: Duration,
) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            community_id TEXT NOT NULL,
            goals TEXT NOT NULL DEFAULT '[]',
            skills TEXT NOT NULL DEFAULT '[]',
            location TEXT,
            experience INTEGER,
            bio TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            user_id TEXT PRIMARY KEY REFERENCES users(id),
            interests TEXT NOT NULL DEFAULT '[]',
            experience_range TEXT,
            location_radius INTEGER,
            age_range TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One row per unordered pair; pair_key is the sorted "low:high" id pair.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            user1_id TEXT NOT NULL REFERENCES users(id),
            user2_id TEXT NOT NULL REFERENCES users(id),
            pair_key TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')),
            compatibility INTEGER NOT NULL DEFAULT 0,
            user1_action TEXT,
            user2_action TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (user1_id <> user2_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS connections (
            id TEXT PRIMARY KEY,
            match_id TEXT NOT NULL UNIQUE REFERENCES matches(id),
            pair_key TEXT NOT NULL UNIQUE,
            interaction_level TEXT NOT NULL,
            collaboration_status TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_users_community ON users(community_id);
        CREATE INDEX IF NOT EXISTS idx_matches_user1 ON matches(user1_id);
        CREATE INDEX IF NOT EXISTS idx_matches_user2 ON matches(user2_id);
        CREATE INDEX IF NOT EXISTS idx_matches_created_at ON matches(created_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
