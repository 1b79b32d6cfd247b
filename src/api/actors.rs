//! Actor REST handlers

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::decode_blob;
use crate::db::actors::{self, Actor, ActorInput};
use crate::db::movies::Movie;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request payload for creating an actor
///
/// `photo` carries the optional blob as base64; an absent or zero-length
/// payload means no photo.
#[derive(Debug, Deserialize)]
pub struct CreateActorRequest {
    #[serde(flatten)]
    pub actor: ActorInput,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Request payload for updating an actor
///
/// Carries its own id, which must match the path id. Omitting `photo`
/// preserves the stored blob.
#[derive(Debug, Deserialize)]
pub struct UpdateActorRequest {
    pub id: i64,
    #[serde(flatten)]
    pub actor: ActorInput,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Actor detail with credited movies eagerly resolved
#[derive(Debug, Serialize)]
pub struct ActorDetailResponse {
    #[serde(flatten)]
    pub actor: Actor,
    pub movies: Vec<Movie>,
}

/// GET /api/actors
pub async fn list_actors(State(state): State<AppState>) -> ApiResult<Json<Vec<Actor>>> {
    let all = actors::list_actors(&state.db).await?;
    Ok(Json(all))
}

/// POST /api/actors
pub async fn create_actor(
    State(state): State<AppState>,
    Json(payload): Json<CreateActorRequest>,
) -> ApiResult<(StatusCode, Json<Actor>)> {
    let photo = decode_blob(payload.photo.as_deref())?;

    let created = actors::insert_actor(&state.db, &payload.actor, photo.as_deref()).await?;

    tracing::info!(actor_id = created.id, "Actor created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/actors/:id
pub async fn get_actor_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ActorDetailResponse>> {
    let actor = actors::get_actor(&state.db, id).await?;
    let movies = actors::movies_for_actor(&state.db, id).await?;

    Ok(Json(ActorDetailResponse { actor, movies }))
}

/// PUT /api/actors/:id
pub async fn update_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateActorRequest>,
) -> ApiResult<Json<Actor>> {
    if id != payload.id {
        return Err(ApiError::NotFound(format!(
            "actor id {} does not match request body id {}",
            id, payload.id
        )));
    }

    let photo = decode_blob(payload.photo.as_deref())?;

    actors::update_actor(&state.db, id, &payload.actor, photo.as_deref()).await?;

    let updated = actors::get_actor(&state.db, id).await?;
    Ok(Json(updated))
}

/// DELETE /api/actors/:id
pub async fn delete_actor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    actors::delete_actor(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/actors/:id/photo
pub async fn get_actor_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    match actors::load_photo(&state.db, id).await? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )),
        None => Err(ApiError::NotFound(format!("actor {} has no photo", id))),
    }
}

/// Build actor routes
pub fn actor_routes() -> Router<AppState> {
    Router::new()
        .route("/api/actors", get(list_actors).post(create_actor))
        .route(
            "/api/actors/:id",
            get(get_actor_detail).put(update_actor).delete(delete_actor),
        )
        .route("/api/actors/:id/photo", get(get_actor_photo))
}
