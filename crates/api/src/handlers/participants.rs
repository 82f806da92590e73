//! Handlers for event membership: listing, removal, and leaving.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use santa_core::draw::{AssignmentView, PersonRef, RedrawResult, RemovalReport};
use santa_core::error::CoreError;
use santa_core::types::{EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::{load_access, require_member};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Message returned when a redraw after removal could not be satisfied.
const REDRAW_FAILED_MESSAGE: &str = "Failed to redraw assignments. Assignments have been cleared.";

/// One roster entry. `receiver` is only filled in for the organizer.
#[derive(Debug, Serialize)]
pub struct ParticipantView {
    pub user_id: UserId,
    pub display_name: String,
    pub is_organizer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<PersonRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveParticipantParams {
    /// Recompute assignments over the remaining roster instead of clearing.
    #[serde(default)]
    pub auto_redraw: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    pub user_id: UserId,
    /// One of `not_needed`, `cleared`, `redrawn`, `failed_and_cleared`.
    pub redraw: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// New assignments, shown to the organizer after a successful redraw.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<AssignmentView>>,
}

impl RemovalResponse {
    fn new(user_id: UserId, redraw: RedrawResult, show_assignments: bool) -> Self {
        let (status, message, assignments) = match redraw {
            RedrawResult::NotNeeded => ("not_needed", None, None),
            RedrawResult::Cleared => ("cleared", None, None),
            RedrawResult::Redrawn(views) => ("redrawn", None, show_assignments.then_some(views)),
            RedrawResult::FailedAndCleared(reason) => (
                "failed_and_cleared",
                Some(format!("{REDRAW_FAILED_MESSAGE} {reason}")),
                None,
            ),
            RedrawResult::RosterChanged => (
                "failed_and_cleared",
                Some(format!(
                    "{REDRAW_FAILED_MESSAGE} Participants changed during the redraw."
                )),
                None,
            ),
        };
        Self {
            user_id,
            redraw: status,
            message,
            assignments,
        }
    }
}

/// GET /api/v1/events/{id}/participants
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<Vec<ParticipantView>>>> {
    let access = load_access(&state, event_id, &user).await?;
    let roster = require_member(&state, &access).await?;

    let receivers: HashMap<UserId, UserId> = if access.is_organizer() {
        state
            .store
            .list_assignments(event_id)
            .await?
            .into_iter()
            .map(|p| (p.giver_id, p.receiver_id))
            .collect()
    } else {
        HashMap::new()
    };
    let names: HashMap<UserId, &str> = roster
        .iter()
        .map(|p| (p.user_id, p.display_name.as_str()))
        .collect();

    let views = roster
        .iter()
        .map(|p| ParticipantView {
            user_id: p.user_id,
            display_name: p.display_name.clone(),
            is_organizer: p.user_id == access.event.organizer_id,
            receiver: receivers.get(&p.user_id).map(|&id| PersonRef {
                id,
                name: names.get(&id).copied().unwrap_or_default().to_string(),
            }),
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// DELETE /api/v1/events/{id}/participants/{user_id}?auto_redraw=bool
///
/// The organizer may remove anyone except themself; a participant may only
/// remove themself, and never triggers a redraw.
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path((event_id, participant_id)): Path<(EventId, UserId)>,
    Query(params): Query<RemoveParticipantParams>,
) -> AppResult<Json<DataResponse<RemovalResponse>>> {
    let access = load_access(&state, event_id, &user).await?;
    access.require_can_remove(participant_id)?;

    let auto_redraw = params.auto_redraw && access.is_organizer();
    let report = state
        .synchronizer()
        .handle_participant_removal(event_id, participant_id, auto_redraw)
        .await?;

    into_response(report, participant_id, access.is_organizer())
}

/// POST /api/v1/events/{id}/leave
pub async fn leave(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<RemovalResponse>>> {
    let access = load_access(&state, event_id, &user).await?;
    access.require_can_remove(user.user_id)?;

    let report = state
        .synchronizer()
        .handle_participant_removal(event_id, user.user_id, false)
        .await?;

    into_response(report, user.user_id, false)
}

fn into_response(
    report: RemovalReport,
    participant_id: UserId,
    show_assignments: bool,
) -> AppResult<Json<DataResponse<RemovalResponse>>> {
    if !report.removed {
        return Err(CoreError::NotFound {
            entity: "Participant",
            id: participant_id,
        }
        .into());
    }
    Ok(Json(DataResponse {
        data: RemovalResponse::new(participant_id, report.redraw, show_assignments),
    }))
}
