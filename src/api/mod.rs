//! Organizer API. Every route needs a signed-in owner and only touches that
//! owner's events.

mod bulk;
mod events;
mod people;
mod stats;

use axum::{routing::{get, post, put}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route("/{event_id}", get(events::get_event).patch(events::update_event).delete(events::delete_event))
        .route("/{event_id}/duplicate", post(events::duplicate_event))
        .route("/{event_id}/share", get(events::share))

        .route("/{event_id}/people", get(people::list_people).post(people::add_person))
        .route("/{event_id}/people/bulk", post(bulk::bulk_text))
        .route("/{event_id}/people/upload", post(bulk::bulk_upload))
        .route("/{event_id}/people/{person_id}", put(people::update_person).delete(people::remove_person))
        .route("/{event_id}/people/{person_id}/status", get(stats::person_status))

        .route("/{event_id}/responses", get(stats::list_responses))
        .route("/{event_id}/statistics", get(stats::statistics))
}
