use axum::{debug_handler, extract::{Path, State}, response::Html, Json};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    include_res,
    model::CalamityType,
    res::markdown_to_html,
    store::{events::event_by_token, people::people_of},
    AppResult,
};

#[derive(Serialize)]
pub(crate) struct PublicPerson {
    id: Uuid,
    name: String,
}

/// What a responder sees: enough to find their own name, nothing about others' status.
#[derive(Serialize)]
pub(crate) struct PublicEvent {
    title: String,
    description_html: String,
    calamity_type: CalamityType,
    people: Vec<PublicPerson>,
}

#[debug_handler]
pub(crate) async fn respond_page(
    State(db_pool): State<SqlitePool>,
    Path(token): Path<String>,
) -> AppResult<Html<String>> {
    // tokens are alphanumeric once they resolve, so they are safe to splice in
    let event = event_by_token(&db_pool, &token).await?;

    Ok(Html(
        include_res!(str, "/pages/respond.html")
            .replace("{calamity_type}", event.calamity_type.as_str())
            .replace("{token}", &token)
    ))
}

#[debug_handler]
pub(crate) async fn public_event(
    State(db_pool): State<SqlitePool>,
    Path(token): Path<String>,
) -> AppResult<Json<PublicEvent>> {
    let event = event_by_token(&db_pool, &token).await?;
    let people = people_of(&db_pool, event.id)
        .await?
        .into_iter()
        .map(|person| PublicPerson { id: person.id, name: person.name })
        .collect();

    Ok(Json(PublicEvent {
        title: event.title,
        description_html: markdown_to_html(&event.description),
        calamity_type: event.calamity_type,
        people,
    }))
}
