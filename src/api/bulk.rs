use axum::{
    debug_handler,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::Error,
    ingest::{self, IngestSource, SheetIngestResult},
    session::Owner,
    AppResult,
};

#[derive(Deserialize)]
pub(crate) struct BulkText {
    text: String,
}

/// 200 when at least one row made it onto the roster, 422 otherwise.
/// The ingest result is the body either way.
fn ingest_response<T: Serialize>(admitted_count: usize, body: T) -> Response {
    let status = if admitted_count == 0 {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(body)).into_response()
}

#[debug_handler]
pub(crate) async fn bulk_text(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
    Json(BulkText { text }): Json<BulkText>,
) -> AppResult<Response> {
    let result = ingest::ingest(&db_pool, &owner_id, event_id, IngestSource::Text(text)).await?;
    Ok(ingest_response(result.admitted_count, result))
}

#[debug_handler]
pub(crate) async fn bulk_upload(
    State(db_pool): State<SqlitePool>,
    Owner(owner_id): Owner,
    Path(event_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| Error::InvalidFormat(err.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| Error::InvalidFormat(err.body_text()))?;
        upload = Some((bytes.to_vec(), file_name));
        break;
    }

    let Some((bytes, file_name)) = upload else {
        return Err(Error::InvalidFormat("no file uploaded in field \"file\"".to_owned()).into());
    };

    let source = IngestSource::Spreadsheet { bytes, file_name };
    let result = SheetIngestResult::from(ingest::ingest(&db_pool, &owner_id, event_id, source).await?);
    Ok(ingest_response(result.admitted_count, result))
}
