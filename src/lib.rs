//! castlist — actor/movie catalog microservice
//!
//! JSON REST API over SQLite for actors, movies, and the cast credits
//! linking them, plus an adapter that asks a chat-completion backend for
//! synthetic reviews/tweets and scores them with the VADER sentiment
//! lexicon.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

use services::chat_client::ChatClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Chat-completion backend; None disables the buzz endpoints
    pub chat: Option<Arc<ChatClient>>,
    /// Service start time, reported by the health endpoint
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, chat: Option<Arc<ChatClient>>) -> Self {
        Self {
            db,
            chat,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::actors::actor_routes())
        .merge(api::movies::movie_routes())
        .merge(api::credits::credit_routes())
        .merge(api::buzz::buzz_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
