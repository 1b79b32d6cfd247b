//! Buzz endpoints: AI-generated reviews and tweets
//!
//! Thin handlers over the buzz service: load the entity, hand its
//! name/title to the adapter, return the scored texts. 503 when no chat
//! backend is configured.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::{actors, movies};
use crate::error::{ApiError, ApiResult};
use crate::services::buzz::{self, ActorBuzz, MovieBuzz};
use crate::services::chat_client::ChatClient;
use crate::AppState;

/// Reviews for one movie
#[derive(Debug, Serialize)]
pub struct MovieReviewsResponse {
    pub movie_id: i64,
    #[serde(flatten)]
    pub buzz: MovieBuzz,
}

/// Tweets about one actor
#[derive(Debug, Serialize)]
pub struct ActorTweetsResponse {
    pub actor_id: i64,
    #[serde(flatten)]
    pub buzz: ActorBuzz,
}

fn require_chat(state: &AppState) -> ApiResult<Arc<ChatClient>> {
    state
        .chat
        .clone()
        .ok_or_else(|| ApiError::Unavailable("chat backend not configured".to_string()))
}

/// GET /api/movies/:id/reviews
pub async fn get_movie_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MovieReviewsResponse>> {
    let movie = movies::get_movie(&state.db, id).await?;
    let chat = require_chat(&state)?;

    let title = movie.title.as_deref().unwrap_or("(untitled)");
    let buzz = buzz::movie_reviews(&chat, title, movie.year).await?;

    tracing::info!(
        movie_id = id,
        average_sentiment = buzz.average_sentiment,
        "Movie reviews generated"
    );

    Ok(Json(MovieReviewsResponse { movie_id: id, buzz }))
}

/// GET /api/actors/:id/tweets
pub async fn get_actor_tweets(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ActorTweetsResponse>> {
    let actor = actors::get_actor(&state.db, id).await?;
    let chat = require_chat(&state)?;

    let name = actor.name.as_deref().unwrap_or("(unnamed)");
    let buzz = buzz::actor_tweets(&chat, name).await?;

    tracing::info!(
        actor_id = id,
        tweets = buzz.tweets.len(),
        average_sentiment = buzz.average_sentiment,
        "Actor tweets generated"
    );

    Ok(Json(ActorTweetsResponse { actor_id: id, buzz }))
}

/// Build buzz routes
pub fn buzz_routes() -> Router<AppState> {
    Router::new()
        .route("/api/movies/:id/reviews", get(get_movie_reviews))
        .route("/api/actors/:id/tweets", get(get_actor_tweets))
}
