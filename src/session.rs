use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{error::Error, AppError};

/// Session key the auth service writes the verified owner id under.
pub const USER_ID: &str = "user_id";

/// The signed-in organizer. Rejects with 401 when the session has no owner.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError(anyhow::anyhow!(msg)))?;

        match session.get::<String>(USER_ID).await? {
            Some(user_id) => Ok(Owner(user_id)),
            None => Err(Error::Unauthorized.into()),
        }
    }
}
