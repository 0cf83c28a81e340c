use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    model::{Event, EventChanges, NewEvent},
    session::Owner,
    store::events::{self, ShareLink},
    AppResult, AppState, Config,
};

#[derive(Deserialize)]
pub(crate) struct DuplicateRequest {
    title: String,
    #[serde(default)]
    description: String,
}

#[debug_handler]
pub(crate) async fn list_events(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(events::list_events(&db_pool, &owner_id).await?))
}

#[debug_handler]
pub(crate) async fn create_event(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Json(new_event): Json<NewEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = events::create_event(&db_pool, &owner_id, new_event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[debug_handler]
pub(crate) async fn get_event(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Event>> {
    Ok(Json(events::get_event(&db_pool, &owner_id, event_id).await?))
}

#[debug_handler]
pub(crate) async fn update_event(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
    Json(changes): Json<EventChanges>,
) -> AppResult<Json<Event>> {
    Ok(Json(events::update_event(&db_pool, &owner_id, event_id, changes).await?))
}

#[debug_handler]
pub(crate) async fn delete_event(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    events::delete_event(&db_pool, &owner_id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn duplicate_event(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
    Json(DuplicateRequest { title, description }): Json<DuplicateRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = events::duplicate_event(&db_pool, &owner_id, event_id, &title, &description).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[debug_handler(state = AppState)]
pub(crate) async fn share(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<ShareLink>> {
    Ok(Json(events::share_link(&db_pool, &owner_id, event_id, &config.public_base_url).await?))
}
