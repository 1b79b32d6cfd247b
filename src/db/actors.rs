//! Actor database operations

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::db::movies::Movie;
use crate::error::{StoreError, StoreResult};

/// Actor record
///
/// The photo blob is deliberately not part of this struct; it is loaded
/// separately by [`load_photo`] so list and detail queries stay cheap.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub id: i64,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: i64,
    pub imdb_link: Option<String>,
}

/// Typed input for actor create/update
#[derive(Debug, Clone, Deserialize)]
pub struct ActorInput {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: i64,
    pub imdb_link: Option<String>,
}

fn actor_from_row(row: &sqlx::sqlite::SqliteRow) -> Actor {
    Actor {
        id: row.get("id"),
        name: row.get("name"),
        gender: row.get("gender"),
        age: row.get("age"),
        imdb_link: row.get("imdb_link"),
    }
}

/// List all actors
pub async fn list_actors(pool: &SqlitePool) -> StoreResult<Vec<Actor>> {
    let rows = sqlx::query("SELECT id, name, gender, age, imdb_link FROM actors ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(actor_from_row).collect())
}

/// Load actor by id
pub async fn get_actor(pool: &SqlitePool, id: i64) -> StoreResult<Actor> {
    let row = sqlx::query("SELECT id, name, gender, age, imdb_link FROM actors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(actor_from_row(&row)),
        None => Err(StoreError::NotFound(format!("actor {} does not exist", id))),
    }
}

/// Check whether another actor already holds the (name, age) key
///
/// A NULL name never collides, matching the unique index's treatment of
/// NULLs as distinct.
async fn has_duplicate(
    pool: &SqlitePool,
    name: Option<&str>,
    age: i64,
    exclude_id: Option<i64>,
) -> StoreResult<bool> {
    let row = match exclude_id {
        Some(id) => {
            sqlx::query("SELECT id FROM actors WHERE name = ? AND age = ? AND id <> ?")
                .bind(name)
                .bind(age)
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT id FROM actors WHERE name = ? AND age = ?")
                .bind(name)
                .bind(age)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.is_some())
}

fn duplicate_actor() -> StoreError {
    StoreError::DuplicateEntity("An actor with this name and age already exists.".to_string())
}

/// Insert a new actor, with an optional photo blob
pub async fn insert_actor(
    pool: &SqlitePool,
    input: &ActorInput,
    photo: Option<&[u8]>,
) -> StoreResult<Actor> {
    if has_duplicate(pool, input.name.as_deref(), input.age, None).await? {
        return Err(duplicate_actor());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO actors (name, gender, age, imdb_link, photo)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.gender)
    .bind(input.age)
    .bind(&input.imdb_link)
    .bind(photo)
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_write_error(e, duplicate_actor(), "actor"))?;

    Ok(Actor {
        id: result.last_insert_rowid(),
        name: input.name.clone(),
        gender: input.gender.clone(),
        age: input.age,
        imdb_link: input.imdb_link.clone(),
    })
}

/// Update an actor by id
///
/// When no new photo is supplied the stored blob is left untouched. A
/// vanished row (0 rows affected) reports not-found rather than silently
/// succeeding.
pub async fn update_actor(
    pool: &SqlitePool,
    id: i64,
    input: &ActorInput,
    photo: Option<&[u8]>,
) -> StoreResult<()> {
    if has_duplicate(pool, input.name.as_deref(), input.age, Some(id)).await? {
        return Err(duplicate_actor());
    }

    let result = match photo {
        Some(bytes) => {
            sqlx::query(
                r#"
                UPDATE actors
                SET name = ?, gender = ?, age = ?, imdb_link = ?, photo = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&input.name)
            .bind(&input.gender)
            .bind(input.age)
            .bind(&input.imdb_link)
            .bind(bytes)
            .bind(id)
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                r#"
                UPDATE actors
                SET name = ?, gender = ?, age = ?, imdb_link = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(&input.name)
            .bind(&input.gender)
            .bind(input.age)
            .bind(&input.imdb_link)
            .bind(id)
            .execute(pool)
            .await
        }
    }
    .map_err(|e| StoreError::from_write_error(e, duplicate_actor(), "actor"))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("actor {} does not exist", id)));
    }

    Ok(())
}

/// Delete an actor by id
///
/// Idempotent: deleting an absent id is a no-op. Credits referencing the
/// actor are removed by the cascade.
pub async fn delete_actor(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    sqlx::query("DELETE FROM actors WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load the actor's photo blob
pub async fn load_photo(pool: &SqlitePool, id: i64) -> StoreResult<Option<Vec<u8>>> {
    let row = sqlx::query("SELECT photo FROM actors WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(row.get("photo")),
        None => Err(StoreError::NotFound(format!("actor {} does not exist", id))),
    }
}

/// Movies the actor is credited in
pub async fn movies_for_actor(pool: &SqlitePool, actor_id: i64) -> StoreResult<Vec<Movie>> {
    let rows = sqlx::query(
        r#"
        SELECT m.id, m.title, m.imdb_link, m.genre, m.year
        FROM movies m
        JOIN credits c ON c.movie_id = m.id
        WHERE c.actor_id = ?
        ORDER BY m.id
        "#,
    )
    .bind(actor_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(crate::db::movies::movie_from_row).collect())
}
