//! Database access for castlist
//!
//! SQLite via sqlx. One pool is created at startup and handed to every
//! handler through `AppState`; the schema is created on first connect.

pub mod actors;
pub mod credits;
pub mod movies;

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Initialize database connection pool
///
/// Opens (or creates) the database file, enables foreign key enforcement on
/// every connection, and applies the schema.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    tracing::debug!("Connecting to database: {}", db_path.display());

    let pool = SqlitePool::connect_with(options).await?;
    init_schema(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the schema applied
///
/// Used by the test suites; a single connection keeps the in-memory
/// database alive and shared across queries.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables and unique indexes if they don't exist
///
/// Uniqueness keys — actors(name, age), movies(title, year), and the
/// credits(actor_id, movie_id) pair — are real indexes, not just
/// application-layer checks, so concurrent identical writes cannot both land.
/// Credits cascade when their actor or movie is deleted.
async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS actors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            gender TEXT,
            age INTEGER NOT NULL,
            imdb_link TEXT,
            photo BLOB,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_actors_name_age ON actors(name, age)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            imdb_link TEXT,
            genre TEXT,
            year INTEGER NOT NULL,
            poster BLOB,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_movies_title_year ON movies(title, year)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_id INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
            movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_credits_actor_movie ON credits(actor_id, movie_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (actors, movies, credits)");

    Ok(())
}
