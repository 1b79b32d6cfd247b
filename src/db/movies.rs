//! Movie database operations

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::db::actors::Actor;
use crate::error::{StoreError, StoreResult};

/// Movie record (poster blob loaded separately, see [`load_poster`])
#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: Option<String>,
    pub imdb_link: Option<String>,
    pub genre: Option<String>,
    pub year: i64,
}

/// Typed input for movie create/update
#[derive(Debug, Clone, Deserialize)]
pub struct MovieInput {
    pub title: Option<String>,
    pub imdb_link: Option<String>,
    pub genre: Option<String>,
    pub year: i64,
}

pub(crate) fn movie_from_row(row: &sqlx::sqlite::SqliteRow) -> Movie {
    Movie {
        id: row.get("id"),
        title: row.get("title"),
        imdb_link: row.get("imdb_link"),
        genre: row.get("genre"),
        year: row.get("year"),
    }
}

/// List all movies
pub async fn list_movies(pool: &SqlitePool) -> StoreResult<Vec<Movie>> {
    let rows = sqlx::query("SELECT id, title, imdb_link, genre, year FROM movies ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(movie_from_row).collect())
}

/// Load movie by id
pub async fn get_movie(pool: &SqlitePool, id: i64) -> StoreResult<Movie> {
    let row = sqlx::query("SELECT id, title, imdb_link, genre, year FROM movies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(movie_from_row(&row)),
        None => Err(StoreError::NotFound(format!("movie {} does not exist", id))),
    }
}

async fn has_duplicate(
    pool: &SqlitePool,
    title: Option<&str>,
    year: i64,
    exclude_id: Option<i64>,
) -> StoreResult<bool> {
    let row = match exclude_id {
        Some(id) => {
            sqlx::query("SELECT id FROM movies WHERE title = ? AND year = ? AND id <> ?")
                .bind(title)
                .bind(year)
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT id FROM movies WHERE title = ? AND year = ?")
                .bind(title)
                .bind(year)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.is_some())
}

fn duplicate_movie() -> StoreError {
    StoreError::DuplicateEntity("A movie with this title and year already exists.".to_string())
}

/// Insert a new movie, with an optional poster blob
pub async fn insert_movie(
    pool: &SqlitePool,
    input: &MovieInput,
    poster: Option<&[u8]>,
) -> StoreResult<Movie> {
    if has_duplicate(pool, input.title.as_deref(), input.year, None).await? {
        return Err(duplicate_movie());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO movies (title, imdb_link, genre, year, poster)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.imdb_link)
    .bind(&input.genre)
    .bind(input.year)
    .bind(poster)
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_write_error(e, duplicate_movie(), "movie"))?;

    Ok(Movie {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        imdb_link: input.imdb_link.clone(),
        genre: input.genre.clone(),
        year: input.year,
    })
}

/// Update a movie by id, preserving the stored poster when none is supplied
pub async fn update_movie(
    pool: &SqlitePool,
    id: i64,
    input: &MovieInput,
    poster: Option<&[u8]>,
) -> StoreResult<()> {
    if has_duplicate(pool, input.title.as_deref(), input.year, Some(id)).await? {
        return Err(duplicate_movie());
    }

    let result = match poster {
        Some(bytes) => {
            sqlx::query(
                r#"
                UPDATE movies
                SET title = ?, imdb_link = ?, genre = ?, year = ?, poster = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&input.title)
            .bind(&input.imdb_link)
            .bind(&input.genre)
            .bind(input.year)
            .bind(bytes)
            .bind(id)
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                r#"
                UPDATE movies
                SET title = ?, imdb_link = ?, genre = ?, year = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&input.title)
            .bind(&input.imdb_link)
            .bind(&input.genre)
            .bind(input.year)
            .bind(id)
            .execute(pool)
            .await
        }
    }
    .map_err(|e| StoreError::from_write_error(e, duplicate_movie(), "movie"))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("movie {} does not exist", id)));
    }

    Ok(())
}

/// Delete a movie by id (idempotent; dependent credits cascade)
pub async fn delete_movie(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    sqlx::query("DELETE FROM movies WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load the movie's poster blob
pub async fn load_poster(pool: &SqlitePool, id: i64) -> StoreResult<Option<Vec<u8>>> {
    let row = sqlx::query("SELECT poster FROM movies WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(row.get("poster")),
        None => Err(StoreError::NotFound(format!("movie {} does not exist", id))),
    }
}

/// Actors credited in the movie
pub async fn actors_for_movie(pool: &SqlitePool, movie_id: i64) -> StoreResult<Vec<Actor>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.name, a.gender, a.age, a.imdb_link
        FROM actors a
        JOIN credits c ON c.actor_id = a.id
        WHERE c.movie_id = ?
        ORDER BY a.id
        "#,
    )
    .bind(movie_id)
    .fetch_all(pool)
    .await?;

    let actors = rows
        .iter()
        .map(|row| Actor {
            id: row.get("id"),
            name: row.get("name"),
            gender: row.get("gender"),
            age: row.get("age"),
            imdb_link: row.get("imdb_link"),
        })
        .collect();

    Ok(actors)
}
