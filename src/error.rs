use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of roster, event and response operations.
///
/// Per-row ingestion failures are not here, see [`crate::ingest::RowError`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("event belongs to another owner")]
    Forbidden,

    #[error("not signed in")]
    Unauthorized,

    #[error("invalid input: {0}")]
    Validation(String),

    /// Unreadable upload, or a file type that is not a spreadsheet.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub(crate) fn event_not_found() -> Self {
        Error::NotFound("event".to_owned())
    }

    pub(crate) fn person_not_found() -> Self {
        Error::NotFound("person".to_owned())
    }
}
