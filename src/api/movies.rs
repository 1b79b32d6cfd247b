//! Movie REST handlers

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::decode_blob;
use crate::db::actors::Actor;
use crate::db::movies::{self, Movie, MovieInput};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request payload for creating a movie (`poster` is optional base64)
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    #[serde(flatten)]
    pub movie: MovieInput,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Request payload for updating a movie
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub id: i64,
    #[serde(flatten)]
    pub movie: MovieInput,
    #[serde(default)]
    pub poster: Option<String>,
}

/// Movie detail with credited actors eagerly resolved
#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: Movie,
    pub actors: Vec<Actor>,
}

/// GET /api/movies
pub async fn list_movies(State(state): State<AppState>) -> ApiResult<Json<Vec<Movie>>> {
    let all = movies::list_movies(&state.db).await?;
    Ok(Json(all))
}

/// POST /api/movies
pub async fn create_movie(
    State(state): State<AppState>,
    Json(payload): Json<CreateMovieRequest>,
) -> ApiResult<(StatusCode, Json<Movie>)> {
    let poster = decode_blob(payload.poster.as_deref())?;

    let created = movies::insert_movie(&state.db, &payload.movie, poster.as_deref()).await?;

    tracing::info!(movie_id = created.id, "Movie created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/movies/:id
pub async fn get_movie_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MovieDetailResponse>> {
    let movie = movies::get_movie(&state.db, id).await?;
    let actors = movies::actors_for_movie(&state.db, id).await?;

    Ok(Json(MovieDetailResponse { movie, actors }))
}

/// PUT /api/movies/:id
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMovieRequest>,
) -> ApiResult<Json<Movie>> {
    if id != payload.id {
        return Err(ApiError::NotFound(format!(
            "movie id {} does not match request body id {}",
            id, payload.id
        )));
    }

    let poster = decode_blob(payload.poster.as_deref())?;

    movies::update_movie(&state.db, id, &payload.movie, poster.as_deref()).await?;

    let updated = movies::get_movie(&state.db, id).await?;
    Ok(Json(updated))
}

/// DELETE /api/movies/:id
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    movies::delete_movie(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/movies/:id/poster
pub async fn get_movie_poster(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    match movies::load_poster(&state.db, id).await? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )),
        None => Err(ApiError::NotFound(format!("movie {} has no poster", id))),
    }
}

/// Build movie routes
pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/api/movies", get(list_movies).post(create_movie))
        .route(
            "/api/movies/:id",
            get(get_movie_detail).put(update_movie).delete(delete_movie),
        )
        .route("/api/movies/:id/poster", get(get_movie_poster))
}
