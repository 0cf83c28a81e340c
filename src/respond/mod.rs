//! Public self-report pages, reached through an event's share link.
//! No session; the share token alone identifies the event.

mod page;
mod submit;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(page::respond_page).post(submit::submit_response))
        .route("/{token}/event", get(page::public_event))
}
