use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    model::Response,
    session::Owner,
    stats::{self, PersonStatus, Statistics},
    store::responses,
    AppResult,
};

/// Polled by the organizer dashboard every few seconds.
#[debug_handler]
pub(crate) async fn statistics(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Statistics>> {
    Ok(Json(stats::compute_statistics(&db_pool, &owner_id, event_id).await?))
}

#[debug_handler]
pub(crate) async fn person_status(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path((event_id, person_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<PersonStatus>> {
    Ok(Json(stats::resolve_person_status(&db_pool, &owner_id, event_id, person_id).await?))
}

#[debug_handler]
pub(crate) async fn list_responses(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Vec<Response>>> {
    Ok(Json(responses::list_responses(&db_pool, &owner_id, event_id).await?))
}
