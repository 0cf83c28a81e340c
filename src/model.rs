use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::Error, tags::normalize_tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalamityType {
    Flood,
    Typhoon,
    Storm,
    Earthquake,
    Fire,
    Other,
}

impl CalamityType {
    pub fn as_str(&self) -> &'static str {
        use CalamityType::*;
        match self {
            Flood => "flood",
            Typhoon => "typhoon",
            Storm => "storm",
            Earthquake => "earthquake",
            Fire => "fire",
            Other => "other",
        }
    }
}

impl fmt::Display for CalamityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalamityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use CalamityType::*;
        match s {
            "flood" => Ok(Flood),
            "typhoon" => Ok(Typhoon),
            "storm" => Ok(Storm),
            "earthquake" => Ok(Earthquake),
            "fire" => Ok(Fire),
            "other" => Ok(Other),
            _ => Err(Error::Validation(format!("unknown calamity_type {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub calamity_type: CalamityType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields an owner supplies when creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Kept as text so an unknown value surfaces as a validation error rather than a decode error.
    pub calamity_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub calamity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub contact: String,
    pub tags: Vec<String>,
}

/// A person's fields before an identifier is minted.
///
/// `tags` is always normalized: trimmed, non-empty, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonDraft {
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PersonDraft {
    pub fn new(name: impl Into<String>, contact: impl Into<String>, tags: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            tags: normalize_tags(tags),
        }
    }

    /// Trims fields and normalizes tags, rejecting an empty name or contact.
    pub fn validated(self) -> Result<Self, Error> {
        let name = self.name.trim();
        let contact = self.contact.trim();
        if name.is_empty() {
            return Err(Error::Validation("name is required".to_owned()));
        }
        if contact.is_empty() {
            return Err(Error::Validation("contact is required".to_owned()));
        }
        Ok(Self::new(name, contact, &self.tags))
    }
}

/// What a person reported about themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Safe,
    NeedHelp,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Safe => "safe",
            Status::NeedHelp => "need_help",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Status::Safe),
            "need_help" => Ok(Status::NeedHelp),
            _ => Err(Error::Validation(format!("unknown status {s:?}"))),
        }
    }
}

/// A person's current status, derived from their responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedStatus {
    Safe,
    NeedHelp,
    NoResponse,
}

impl From<Status> for ResolvedStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Safe => ResolvedStatus::Safe,
            Status::NeedHelp => ResolvedStatus::NeedHelp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Uuid,
    pub event_id: Uuid,
    pub person_id: Uuid,
    pub status: Status,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub response_time: OffsetDateTime,
}
