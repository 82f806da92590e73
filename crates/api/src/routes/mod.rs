pub mod events;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events                                          create (POST)
/// /events/join                                     join by code (POST)
/// /events/{id}                                     get
/// /events/{id}/participants                        list
/// /events/{id}/participants/{user_id}              remove (DELETE, ?auto_redraw)
/// /events/{id}/leave                               leave (POST)
/// /events/{id}/exclusions                          list, add, delete
/// /events/{id}/draw                                draw (POST)
/// /events/{id}/assignments                         list, manual edit (PUT), clear (DELETE)
/// /events/{id}/assignments/me                      own receiver (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/events", events::router())
}
