use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    model::{Response, Status},
};

use super::{events::owned_event, parse_column, parse_id, people::person_in_event};

#[derive(FromRow)]
struct ResponseRow {
    id: String,
    event_id: String,
    person_id: String,
    status: String,
    message: Option<String>,
    response_time: OffsetDateTime,
}

impl TryFrom<ResponseRow> for Response {
    type Error = Error;

    fn try_from(row: ResponseRow) -> Result<Self> {
        Ok(Response {
            id: parse_id(&row.id)?,
            event_id: parse_id(&row.event_id)?,
            person_id: parse_id(&row.person_id)?,
            status: parse_column(&row.status)?,
            message: row.message,
            response_time: row.response_time,
        })
    }
}

/// Appends a self-report for a person on the event's roster.
///
/// Earlier reports are kept; the newest `response_time` decides the person's
/// status when statistics are computed.
pub async fn record_response(
    db_pool: &SqlitePool,
    event_id: Uuid,
    person_id: Uuid,
    status: Status,
    message: Option<String>,
    response_time: OffsetDateTime,
) -> Result<Response> {
    let mut tx = db_pool.begin().await?;
    person_in_event(&mut *tx, event_id, person_id).await?;

    let response = Response {
        id: Uuid::now_v7(),
        event_id,
        person_id,
        status,
        message: message
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty()),
        response_time,
    };
    insert_response(&mut *tx, &response).await?;
    tx.commit().await?;

    debug!(%event_id, %person_id, status = status.as_str(), "recorded response");
    Ok(response)
}

/// A person removed since the roster check fails the foreign key; that is
/// reported as the person being gone.
async fn insert_response<'e>(db: impl SqliteExecutor<'e>, response: &Response) -> Result<()> {
    sqlx::query("INSERT INTO responses (id,event_id,person_id,status,message,response_time) VALUES (?,?,?,?,?,?)")
        .bind(response.id.to_string())
        .bind(response.event_id.to_string())
        .bind(response.person_id.to_string())
        .bind(response.status.as_str())
        .bind(&response.message)
        .bind(response.response_time)
        .execute(db)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => Error::person_not_found(),
            err => err.into(),
        })?;
    Ok(())
}

/// Every response of an event in arrival order, without an ownership check.
pub(crate) async fn responses_of<'e>(db: impl SqliteExecutor<'e>, event_id: Uuid) -> Result<Vec<Response>> {
    let rows: Vec<ResponseRow> = sqlx::query_as(
        "SELECT id,event_id,person_id,status,message,response_time FROM responses WHERE event_id=? ORDER BY rowid",
    )
        .bind(event_id.to_string())
        .fetch_all(db)
        .await?;

    rows.into_iter().map(Response::try_from).collect()
}

pub(crate) async fn responses_of_person<'e>(db: impl SqliteExecutor<'e>, event_id: Uuid, person_id: Uuid) -> Result<Vec<Response>> {
    let rows: Vec<ResponseRow> = sqlx::query_as(
        "SELECT id,event_id,person_id,status,message,response_time FROM responses WHERE event_id=? AND person_id=? ORDER BY rowid",
    )
        .bind(event_id.to_string())
        .bind(person_id.to_string())
        .fetch_all(db)
        .await?;

    rows.into_iter().map(Response::try_from).collect()
}

pub async fn list_responses(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid) -> Result<Vec<Response>> {
    owned_event(db_pool, owner_id, event_id).await?;
    responses_of(db_pool, event_id).await
}
