pub mod api;
pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod model;
pub mod res;
pub mod respond;
pub mod session;
pub mod share;
pub mod stats;
pub mod store;
pub mod tags;

use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> Self {
        Self {
            db_pool,
            config: Arc::new(config),
        }
    }
}

/// The whole service: organizer API, public response pages and sessions.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(state.config.session_idle_minutes)));

    Router::new()
        .route("/health", get(health))

        .merge(auth::router(state.config.dev_login))
        .nest("/api/events", api::router())
        .nest("/respond", respond::router())

        .with_state(state)
        .layer(session_layer)
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
