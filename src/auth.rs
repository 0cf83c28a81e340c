//! Session plumbing at the edge of the external auth service.
//!
//! Credentials are issued elsewhere; that service writes the verified owner id
//! into the session. `POST /dev/login` does the same for local runs and tests
//! and only exists when `DEV_LOGIN` is on.

use axum::{debug_handler, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{error::Error, session::USER_ID, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct DevLoginRequest {
    owner_id: String,
}

pub fn router(dev_login: bool) -> Router<AppState> {
    let router = Router::new().route("/logout", post(logout));

    if dev_login {
        router.route("/dev/login", post(login))
    } else {
        router
    }
}

#[debug_handler]
pub(crate) async fn login(
    session: Session,
    Json(DevLoginRequest { owner_id }): Json<DevLoginRequest>,
) -> AppResult<StatusCode> {
    let owner_id = owner_id.trim().to_owned();
    if owner_id.is_empty() {
        return Err(Error::Validation("owner_id is required".to_owned()).into());
    }

    session.insert(USER_ID, &owner_id).await?;
    info!("welcome u/{owner_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
pub(crate) async fn logout(session: Session) -> StatusCode {
    session.clear().await;
    StatusCode::NO_CONTENT
}
