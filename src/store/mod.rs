//! SQLite-backed event, roster and response operations.
//!
//! Every owner-facing function takes the caller's verified owner id and checks
//! it against the event before touching anything scoped to that event.

pub mod events;
pub mod people;
pub mod responses;

use uuid::Uuid;

use crate::error::{Error, Result};

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|err| Error::Database(sqlx::Error::Decode(Box::new(err))))
}

pub(crate) fn parse_column<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    raw.parse().map_err(|err: Error| Error::Database(sqlx::Error::Decode(Box::new(err))))
}
