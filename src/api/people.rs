use axum::{debug_handler, extract::{Path, State}, http::StatusCode, Json};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    model::{Person, PersonDraft},
    session::Owner,
    store::people,
    AppResult,
};

#[debug_handler]
pub(crate) async fn list_people(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<Vec<Person>>> {
    Ok(Json(people::list_people(&db_pool, &owner_id, event_id).await?))
}

#[debug_handler]
pub(crate) async fn add_person(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
    Json(draft): Json<PersonDraft>,
) -> AppResult<(StatusCode, Json<Person>)> {
    let person = people::add_person(&db_pool, &owner_id, event_id, draft).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

#[debug_handler]
pub(crate) async fn update_person(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path((event_id, person_id)): Path<(Uuid, Uuid)>,
    Json(draft): Json<PersonDraft>,
) -> AppResult<Json<Person>> {
    Ok(Json(people::update_person(&db_pool, &owner_id, event_id, person_id, draft).await?))
}

#[debug_handler]
pub(crate) async fn remove_person(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path((event_id, person_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    people::remove_person(&db_pool, &owner_id, event_id, person_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
