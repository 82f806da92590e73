//! Route definitions for events and everything scoped to one event.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{assignments, events, exclusions, participants};
use crate::state::AppState;

/// Event routes mounted at `/events`.
///
/// ```text
/// POST   /                                   -> events::create
/// POST   /join                               -> events::join
/// GET    /{id}                               -> events::get_by_id
/// PATCH  /{id}                               -> events::update
/// DELETE /{id}                               -> events::delete
/// GET    /{id}/participants                  -> participants::list
/// DELETE /{id}/participants/{user_id}        -> participants::remove
/// POST   /{id}/leave                         -> participants::leave
/// GET    /{id}/exclusions                    -> exclusions::list
/// POST   /{id}/exclusions                    -> exclusions::add
/// DELETE /{id}/exclusions                    -> exclusions::delete
/// POST   /{id}/draw                          -> assignments::draw
/// GET    /{id}/assignments                   -> assignments::list
/// PUT    /{id}/assignments                   -> assignments::manual_edit
/// DELETE /{id}/assignments                   -> assignments::clear
/// GET    /{id}/assignments/me                -> assignments::mine
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::create))
        .route("/join", post(events::join))
        .route(
            "/{id}",
            get(events::get_by_id)
                .patch(events::update)
                .delete(events::delete),
        )
        .route("/{id}/participants", get(participants::list))
        .route(
            "/{id}/participants/{user_id}",
            delete(participants::remove),
        )
        .route("/{id}/leave", post(participants::leave))
        .route(
            "/{id}/exclusions",
            get(exclusions::list)
                .post(exclusions::add)
                .delete(exclusions::delete),
        )
        .route("/{id}/draw", post(assignments::draw))
        .route(
            "/{id}/assignments",
            get(assignments::list)
                .put(assignments::manual_edit)
                .delete(assignments::clear),
        )
        .route("/{id}/assignments/me", get(assignments::mine))
}
