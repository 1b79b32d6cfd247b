//! Cast credit REST handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::credits::{self, Credit, CreditDetail, CreditInput};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request payload for updating a credit; id must match the path id
#[derive(Debug, Deserialize)]
pub struct UpdateCreditRequest {
    pub id: i64,
    #[serde(flatten)]
    pub credit: CreditInput,
}

/// GET /api/credits
pub async fn list_credits(State(state): State<AppState>) -> ApiResult<Json<Vec<CreditDetail>>> {
    let all = credits::list_credits(&state.db).await?;
    Ok(Json(all))
}

/// POST /api/credits
pub async fn create_credit(
    State(state): State<AppState>,
    Json(payload): Json<CreditInput>,
) -> ApiResult<(StatusCode, Json<Credit>)> {
    let created = credits::insert_credit(&state.db, &payload).await?;

    tracing::info!(
        credit_id = created.id,
        actor_id = created.actor_id,
        movie_id = created.movie_id,
        "Credit created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/credits/:id
pub async fn get_credit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CreditDetail>> {
    let detail = credits::get_credit(&state.db, id).await?;
    Ok(Json(detail))
}

/// PUT /api/credits/:id
pub async fn update_credit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCreditRequest>,
) -> ApiResult<Json<CreditDetail>> {
    if id != payload.id {
        return Err(ApiError::NotFound(format!(
            "credit id {} does not match request body id {}",
            id, payload.id
        )));
    }

    credits::update_credit(&state.db, id, &payload.credit).await?;

    let updated = credits::get_credit(&state.db, id).await?;
    Ok(Json(updated))
}

/// DELETE /api/credits/:id
pub async fn delete_credit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    credits::delete_credit(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build credit routes
pub fn credit_routes() -> Router<AppState> {
    Router::new()
        .route("/api/credits", get(list_credits).post(create_credit))
        .route(
            "/api/credits/:id",
            get(get_credit).put(update_credit).delete(delete_credit),
        )
}
