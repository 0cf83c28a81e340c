use sqlx::{types::Json, FromRow, SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    model::{Person, PersonDraft},
};

use super::{events::owned_event, parse_id};

#[derive(FromRow)]
struct PersonRow {
    id: String,
    event_id: String,
    name: String,
    contact: String,
    tags: Json<Vec<String>>,
}

impl TryFrom<PersonRow> for Person {
    type Error = Error;

    fn try_from(row: PersonRow) -> Result<Self> {
        Ok(Person {
            id: parse_id(&row.id)?,
            event_id: parse_id(&row.event_id)?,
            name: row.name,
            contact: row.contact,
            tags: row.tags.0,
        })
    }
}

/// Stores a person under `event_id` with a freshly minted id.
///
/// Callers are responsible for the ownership check and for normalizing `tags`.
pub(crate) async fn insert_person<'e>(
    db: impl SqliteExecutor<'e>,
    event_id: Uuid,
    name: String,
    contact: String,
    tags: Vec<String>,
) -> Result<Person> {
    let person = Person {
        id: Uuid::now_v7(),
        event_id,
        name,
        contact,
        tags,
    };

    sqlx::query("INSERT INTO people (id,event_id,name,contact,tags) VALUES (?,?,?,?,?)")
        .bind(person.id.to_string())
        .bind(event_id.to_string())
        .bind(&person.name)
        .bind(&person.contact)
        .bind(Json(&person.tags))
        .execute(db)
        .await?;

    Ok(person)
}

/// The roster of an event in insertion order, without an ownership check.
pub(crate) async fn people_of<'e>(db: impl SqliteExecutor<'e>, event_id: Uuid) -> Result<Vec<Person>> {
    let rows: Vec<PersonRow> = sqlx::query_as("SELECT id,event_id,name,contact,tags FROM people WHERE event_id=? ORDER BY rowid")
        .bind(event_id.to_string())
        .fetch_all(db)
        .await?;

    rows.into_iter().map(Person::try_from).collect()
}

pub(crate) async fn person_in_event<'e>(db: impl SqliteExecutor<'e>, event_id: Uuid, person_id: Uuid) -> Result<Person> {
    let row: Option<PersonRow> = sqlx::query_as("SELECT id,event_id,name,contact,tags FROM people WHERE id=? AND event_id=?")
        .bind(person_id.to_string())
        .bind(event_id.to_string())
        .fetch_optional(db)
        .await?;

    Person::try_from(row.ok_or_else(Error::person_not_found)?)
}

/// Adds a person to the roster.
///
/// Names and contacts may repeat: the same person can be tracked twice under
/// different tags.
pub async fn add_person(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, draft: PersonDraft) -> Result<Person> {
    owned_event(db_pool, owner_id, event_id).await?;
    let PersonDraft { name, contact, tags } = draft.validated()?;

    insert_person(db_pool, event_id, name, contact, tags).await
}

/// Replaces name, contact and tags of a person already on the roster.
pub async fn update_person(
    db_pool: &SqlitePool,
    owner_id: &str,
    event_id: Uuid,
    person_id: Uuid,
    draft: PersonDraft,
) -> Result<Person> {
    owned_event(db_pool, owner_id, event_id).await?;
    let PersonDraft { name, contact, tags } = draft.validated()?;

    let result = sqlx::query("UPDATE people SET name=?,contact=?,tags=? WHERE id=? AND event_id=?")
        .bind(&name)
        .bind(&contact)
        .bind(Json(&tags))
        .bind(person_id.to_string())
        .bind(event_id.to_string())
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::person_not_found());
    }

    Ok(Person {
        id: person_id,
        event_id,
        name,
        contact,
        tags,
    })
}

/// Removes a person and, through the foreign key, all of their responses.
pub async fn remove_person(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid, person_id: Uuid) -> Result<()> {
    owned_event(db_pool, owner_id, event_id).await?;

    let result = sqlx::query("DELETE FROM people WHERE id=? AND event_id=?")
        .bind(person_id.to_string())
        .bind(event_id.to_string())
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::person_not_found());
    }
    Ok(())
}

pub async fn list_people(db_pool: &SqlitePool, owner_id: &str, event_id: Uuid) -> Result<Vec<Person>> {
    owned_event(db_pool, owner_id, event_id).await?;
    people_of(db_pool, event_id).await
}
