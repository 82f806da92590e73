//! Handlers for the `/events` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use santa_core::error::CoreError;
use santa_core::event::{
    generate_join_code, normalize_join_code, validate_event_details, validate_join_code,
    EventRecord, EventUpdate, JoinOutcome, NewEvent,
};
use santa_core::types::EventId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::{load_access, require_member};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinEventRequest {
    pub join_code: String,
}

/// Event details as seen by a participant.
#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: EventRecord,
    pub is_organizer: bool,
    pub participant_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JoinEventResponse {
    pub event_id: EventId,
    pub name: String,
    pub already_member: bool,
}

/// POST /api/v1/events
///
/// The caller becomes the organizer and first participant.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<NewEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<EventRecord>>)> {
    let input = input.normalized();
    validate_event_details(&input)?;
    let organizer = user.participant()?;

    let join_code = generate_join_code();
    let event = state
        .store
        .create_event(&input, &organizer, &join_code)
        .await?;

    tracing::info!(event_id = event.id, organizer_id = user.user_id, "Event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<EventDetails>>> {
    let access = load_access(&state, event_id, &user).await?;
    let roster = require_member(&state, &access).await?;

    let is_organizer = access.is_organizer();
    Ok(Json(DataResponse {
        data: EventDetails {
            event: access.event,
            is_organizer,
            participant_count: roster.len(),
        },
    }))
}

/// PATCH /api/v1/events/{id}
///
/// Organizer only. Fields left out of the body keep their current value.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
    Json(input): Json<EventUpdate>,
) -> AppResult<Json<DataResponse<EventRecord>>> {
    let access = load_access(&state, event_id, &user).await?;
    access.require_organizer()?;

    let input = input.normalized();
    validate_event_details(&input.merged_with(&access.event))?;

    let event = state
        .store
        .update_event(event_id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;

    tracing::info!(event_id, organizer_id = user.user_id, "Event updated");
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Organizer only. Removes the roster, exclusions and assignments with it.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<StatusCode> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    if !state.store.delete_event(event_id).await? {
        return Err(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }
        .into());
    }

    tracing::info!(event_id, organizer_id = user.user_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/join
///
/// Newcomers are refused once assignments are drawn; the organizer must clear
/// the draw first. The store makes that check under the event lock.
pub async fn join(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<JoinEventRequest>,
) -> AppResult<Json<DataResponse<JoinEventResponse>>> {
    let code = normalize_join_code(&input.join_code);
    validate_join_code(&code)?;
    let participant = user.participant()?;

    let event = state
        .store
        .find_event_by_join_code(&code)
        .await?
        .ok_or_else(|| CoreError::Validation("Invalid join code".to_string()))?;

    let already_member = match state.store.join_event(event.id, &participant).await? {
        JoinOutcome::Joined => {
            tracing::info!(event_id = event.id, user_id = user.user_id, "Participant joined");
            false
        }
        JoinOutcome::AlreadyMember => true,
        JoinOutcome::AlreadyDrawn => {
            return Err(CoreError::Conflict(
                "Assignments have already been drawn for this event".to_string(),
            )
            .into());
        }
    };

    Ok(Json(DataResponse {
        data: JoinEventResponse {
            event_id: event.id,
            name: event.name,
            already_member,
        },
    }))
}
