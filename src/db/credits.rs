//! Cast credit database operations
//!
//! A credit links one actor to one movie. The (actor_id, movie_id) pair is
//! unique: the same actor cannot be credited twice in the same movie.

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::db::actors::Actor;
use crate::db::movies::Movie;
use crate::error::{StoreError, StoreResult};

/// Cast credit row
#[derive(Debug, Clone, Serialize)]
pub struct Credit {
    pub id: i64,
    pub actor_id: i64,
    pub movie_id: i64,
}

/// Typed input for credit create/update
#[derive(Debug, Clone, Deserialize)]
pub struct CreditInput {
    pub actor_id: i64,
    pub movie_id: i64,
}

/// Credit with its actor and movie resolved
#[derive(Debug, Clone, Serialize)]
pub struct CreditDetail {
    pub id: i64,
    pub actor: Actor,
    pub movie: Movie,
}

const DETAIL_QUERY: &str = r#"
    SELECT c.id AS credit_id,
           a.id AS actor_id, a.name AS actor_name, a.gender AS actor_gender,
           a.age AS actor_age, a.imdb_link AS actor_imdb_link,
           m.id AS movie_id, m.title AS movie_title, m.imdb_link AS movie_imdb_link,
           m.genre AS movie_genre, m.year AS movie_year
    FROM credits c
    JOIN actors a ON a.id = c.actor_id
    JOIN movies m ON m.id = c.movie_id
"#;

fn detail_from_row(row: &sqlx::sqlite::SqliteRow) -> CreditDetail {
    CreditDetail {
        id: row.get("credit_id"),
        actor: Actor {
            id: row.get("actor_id"),
            name: row.get("actor_name"),
            gender: row.get("actor_gender"),
            age: row.get("actor_age"),
            imdb_link: row.get("actor_imdb_link"),
        },
        movie: Movie {
            id: row.get("movie_id"),
            title: row.get("movie_title"),
            imdb_link: row.get("movie_imdb_link"),
            genre: row.get("movie_genre"),
            year: row.get("movie_year"),
        },
    }
}

/// List all credits with actor and movie eagerly resolved
pub async fn list_credits(pool: &SqlitePool) -> StoreResult<Vec<CreditDetail>> {
    let rows = sqlx::query(&format!("{} ORDER BY c.id", DETAIL_QUERY))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(detail_from_row).collect())
}

/// Load one credit with actor and movie eagerly resolved
pub async fn get_credit(pool: &SqlitePool, id: i64) -> StoreResult<CreditDetail> {
    let row = sqlx::query(&format!("{} WHERE c.id = ?", DETAIL_QUERY))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(detail_from_row(&row)),
        None => Err(StoreError::NotFound(format!("credit {} does not exist", id))),
    }
}

async fn has_duplicate_pair(
    pool: &SqlitePool,
    actor_id: i64,
    movie_id: i64,
    exclude_id: Option<i64>,
) -> StoreResult<bool> {
    let row = match exclude_id {
        Some(id) => {
            sqlx::query("SELECT id FROM credits WHERE actor_id = ? AND movie_id = ? AND id <> ?")
                .bind(actor_id)
                .bind(movie_id)
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT id FROM credits WHERE actor_id = ? AND movie_id = ?")
                .bind(actor_id)
                .bind(movie_id)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.is_some())
}

fn duplicate_credit() -> StoreError {
    StoreError::DuplicateRelationship(
        "This actor is already assigned to this movie.".to_string(),
    )
}

/// Insert a new credit
///
/// An unknown actor or movie id trips the foreign keys and surfaces as an
/// invalid-reference error rather than a bare database failure.
pub async fn insert_credit(pool: &SqlitePool, input: &CreditInput) -> StoreResult<Credit> {
    if has_duplicate_pair(pool, input.actor_id, input.movie_id, None).await? {
        return Err(duplicate_credit());
    }

    let result = sqlx::query("INSERT INTO credits (actor_id, movie_id) VALUES (?, ?)")
        .bind(input.actor_id)
        .bind(input.movie_id)
        .execute(pool)
        .await
        .map_err(|e| {
            StoreError::from_write_error(e, duplicate_credit(), "actor or movie does not exist")
        })?;

    Ok(Credit {
        id: result.last_insert_rowid(),
        actor_id: input.actor_id,
        movie_id: input.movie_id,
    })
}

/// Update a credit by id
pub async fn update_credit(pool: &SqlitePool, id: i64, input: &CreditInput) -> StoreResult<()> {
    if has_duplicate_pair(pool, input.actor_id, input.movie_id, Some(id)).await? {
        return Err(duplicate_credit());
    }

    let result = sqlx::query("UPDATE credits SET actor_id = ?, movie_id = ? WHERE id = ?")
        .bind(input.actor_id)
        .bind(input.movie_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            StoreError::from_write_error(e, duplicate_credit(), "actor or movie does not exist")
        })?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("credit {} does not exist", id)));
    }

    Ok(())
}

/// Delete a credit by id (idempotent)
pub async fn delete_credit(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    sqlx::query("DELETE FROM credits WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::actors::{insert_actor, ActorInput};
    use crate::db::init_memory_pool;
    use crate::db::movies::{delete_movie, insert_movie, MovieInput};

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let actor = insert_actor(
            pool,
            &ActorInput {
                name: Some("Amy Adams".to_string()),
                gender: Some("Female".to_string()),
                age: 51,
                imdb_link: None,
            },
            None,
        )
        .await
        .expect("actor");

        let movie = insert_movie(
            pool,
            &MovieInput {
                title: Some("Arrival".to_string()),
                imdb_link: None,
                genre: Some("Science Fiction".to_string()),
                year: 2016,
            },
            None,
        )
        .await
        .expect("movie");

        (actor.id, movie.id)
    }

    #[tokio::test]
    async fn test_create_and_list_eagerly_resolved() {
        let pool = init_memory_pool().await.expect("pool");
        let (actor_id, movie_id) = seed(&pool).await;

        let credit = insert_credit(
            &pool,
            &CreditInput { actor_id, movie_id },
        )
        .await
        .expect("credit");

        let all = list_credits(&pool).await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, credit.id);
        assert_eq!(all[0].actor.name.as_deref(), Some("Amy Adams"));
        assert_eq!(all[0].movie.title.as_deref(), Some("Arrival"));
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let pool = init_memory_pool().await.expect("pool");
        let (actor_id, movie_id) = seed(&pool).await;

        insert_credit(&pool, &CreditInput { actor_id, movie_id })
            .await
            .expect("first");

        let err = insert_credit(&pool, &CreditInput { actor_id, movie_id })
            .await
            .expect_err("duplicate pair");
        assert!(matches!(err, StoreError::DuplicateRelationship(_)));
    }

    #[tokio::test]
    async fn test_update_onto_own_pair_allowed() {
        let pool = init_memory_pool().await.expect("pool");
        let (actor_id, movie_id) = seed(&pool).await;

        let credit = insert_credit(&pool, &CreditInput { actor_id, movie_id })
            .await
            .expect("insert");

        // Re-submitting the same pair for the same row is not a duplicate
        update_credit(&pool, credit.id, &CreditInput { actor_id, movie_id })
            .await
            .expect("self update");
    }

    #[tokio::test]
    async fn test_unknown_reference_rejected() {
        let pool = init_memory_pool().await.expect("pool");

        let err = insert_credit(
            &pool,
            &CreditInput {
                actor_id: 404,
                movie_id: 404,
            },
        )
        .await
        .expect_err("unknown ids");
        assert!(matches!(err, StoreError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_deleting_movie_cascades_credits() {
        let pool = init_memory_pool().await.expect("pool");
        let (actor_id, movie_id) = seed(&pool).await;

        insert_credit(&pool, &CreditInput { actor_id, movie_id })
            .await
            .expect("insert");

        delete_movie(&pool, movie_id).await.expect("delete movie");

        assert!(list_credits(&pool).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let pool = init_memory_pool().await.expect("pool");

        delete_credit(&pool, 777).await.expect("absent id is a no-op");
    }
}
