use axum::{debug_handler, extract::{Path, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    model::Status,
    store::{events::event_by_token, responses::record_response},
    AppResult,
};

#[derive(Deserialize)]
pub(crate) struct SubmitResponse {
    person_id: Uuid,
    status: String,
    message: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct Acknowledgement {
    status: Status,
    #[serde(with = "time::serde::rfc3339")]
    response_time: OffsetDateTime,
}

#[debug_handler]
pub(crate) async fn submit_response(
    State(db_pool): State<SqlitePool>,
    Path(token): Path<String>,
    Json(SubmitResponse { person_id, status, message }): Json<SubmitResponse>,
) -> AppResult<Json<Acknowledgement>> {
    let status: Status = status.parse()?;
    let event = event_by_token(&db_pool, &token).await?;

    let response = record_response(&db_pool, event.id, person_id, status, message, OffsetDateTime::now_utc()).await?;

    Ok(Json(Acknowledgement {
        status: response.status,
        response_time: response.response_time,
    }))
}
