use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    model::{CalamityType, Event, EventChanges, NewEvent},
    share,
};

use super::{parse_column, parse_id, people};

#[derive(FromRow)]
struct EventRow {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    calamity_type: String,
    created_at: OffsetDateTime,
}

impl TryFrom<EventRow> for Event {
    type Error = Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: parse_id(&row.id)?,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            calamity_type: parse_column(&row.calamity_type)?,
            created_at: row.created_at,
        })
    }
}

const EVENT_COLUMNS: &str = "id,owner_id,title,description,calamity_type,created_at";

#[derive(Debug, Clone, Serialize)]
pub struct ShareLink {
    pub share_token: String,
    pub share_url: String,
    pub event_title: String,
}

fn required_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Validation("title is required".to_owned()));
    }
    Ok(title.to_owned())
}

async fn insert_event<'e>(
    db: impl SqliteExecutor<'e>,
    owner_id: &str,
    title: String,
    description: String,
    calamity_type: CalamityType,
) -> Result<Event> {
    let event = Event {
        id: Uuid::now_v7(),
        owner_id: owner_id.to_owned(),
        title,
        description,
        calamity_type,
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO events (id,owner_id,title,description,calamity_type,share_token,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(event.id.to_string())
        .bind(&event.owner_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.calamity_type.as_str())
        .bind(share::new_token())
        .bind(event.created_at)
        .execute(db)
        .await?;

    Ok(event)
}

/// Loads an event and checks that `owner_id` owns it.
pub(crate) async fn owned_event<'e>(db: impl SqliteExecutor<'e>, owner_id: &str, event_id: Uuid) -> Result<Event> {
    let row: Option<EventRow> = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id=?"))
        .bind(event_id.to_string())
        .fetch_optional(db)
        .await?;

    let event = Event::try_from(row.ok_or_else(Error::event_not_found)?)?;
    if event.owner_id != owner_id {
        return Err(Error::Forbidden);
    }
    Ok(event)
}

pub async fn create_event(db_pool: &SqlitePool, owner_id: &str, new_event: NewEvent) -> Result<Event> {
    let title = required_title(&new_event.title)?;
    let calamity_type = new_event.calamity_type.parse()?;

    let event = insert_event(db_pool, owner_id, title, new_event.description.trim().to_owned(), calamity_type).await?;
    info!(event_id = %event.id, owner_id, "created event {:?}", event.title);
    Ok(event)
}

pub async fn get_event(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid) -> Result<Event> {
    owned_event(db_pool, owner_id, event_id).await
}

/// The owner's events, newest first.
pub async fn list_events(db_pool: &SqlitePool, owner_id: &str) -> Result<Vec<Event>> {
    let rows: Vec<EventRow> = sqlx::query_as(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id=? ORDER BY created_at DESC, rowid DESC"
    ))
        .bind(owner_id)
        .fetch_all(db_pool)
        .await?;

    rows.into_iter().map(Event::try_from).collect()
}

pub async fn update_event(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, changes: EventChanges) -> Result<Event> {
    let mut event = owned_event(db_pool, owner_id, event_id).await?;

    if let Some(title) = changes.title {
        event.title = required_title(&title)?;
    }
    if let Some(description) = changes.description {
        event.description = description.trim().to_owned();
    }
    if let Some(calamity_type) = changes.calamity_type {
        event.calamity_type = calamity_type.parse()?;
    }

    sqlx::query("UPDATE events SET title=?,description=?,calamity_type=? WHERE id=?")
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.calamity_type.as_str())
        .bind(event.id.to_string())
        .execute(db_pool)
        .await?;

    Ok(event)
}

/// Deletes the event together with its roster and every response.
pub async fn delete_event(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid) -> Result<()> {
    owned_event(db_pool, owner_id, event_id).await?;

    sqlx::query("DELETE FROM events WHERE id=?")
        .bind(event_id.to_string())
        .execute(db_pool)
        .await?;

    info!(%event_id, owner_id, "deleted event");
    Ok(())
}

/// Copies an event and its whole roster into a new event.
///
/// The copy gets the source's calamity type, a fresh creation time, a fresh
/// share token and new person ids. Responses stay behind, so every copied
/// person starts out as `no_response`. A source the caller does not own is
/// reported as not found.
pub async fn duplicate_event(
    db_pool: &SqlitePool,
    owner_id: &str,
    source_id: Uuid,
    new_title: &str,
    new_description: &str,
) -> Result<Event> {
    let title = required_title(new_title)?;

    let mut tx = db_pool.begin().await?;

    let source = match owned_event(&mut *tx, owner_id, source_id).await {
        Err(Error::Forbidden) => return Err(Error::event_not_found()),
        other => other?,
    };
    let roster = people::people_of(&mut *tx, source.id).await?;

    let copy = insert_event(&mut *tx, owner_id, title, new_description.trim().to_owned(), source.calamity_type).await?;
    for person in &roster {
        people::insert_person(&mut *tx, copy.id, person.name.clone(), person.contact.clone(), person.tags.clone()).await?;
    }

    tx.commit().await?;

    info!(source_id = %source.id, event_id = %copy.id, people = roster.len(), "duplicated event");
    Ok(copy)
}

pub async fn share_link(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, public_base_url: &str) -> Result<ShareLink> {
    let event = owned_event(db_pool, owner_id, event_id).await?;

    let (share_token,): (String,) = sqlx::query_as("SELECT share_token FROM events WHERE id=?")
        .bind(event.id.to_string())
        .fetch_one(db_pool)
        .await?;

    Ok(ShareLink {
        share_url: share::share_url(public_base_url, &share_token),
        share_token,
        event_title: event.title,
    })
}

/// Resolves a public share token. No ownership check; the token is the credential.
pub async fn event_by_token(db_pool: &SqlitePool, share_token: &str) -> Result<Event> {
    let row: Option<EventRow> = sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE share_token=?"))
        .bind(share_token)
        .fetch_optional(db_pool)
        .await?;

    Event::try_from(row.ok_or_else(Error::event_not_found)?)
}
