//! Handlers for drawing, editing, clearing, and reading assignments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use santa_core::draw::{AssignmentView, DrawOutcome, EditOutcome, PersonRef};
use santa_core::error::CoreError;
use santa_core::solver::AssignmentPair;
use santa_core::types::EventId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::{load_access, require_member};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ManualEditRequest {
    pub assignments: Vec<AssignmentPair>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentsResponse {
    pub draw_completed: bool,
    pub assignments: Vec<AssignmentView>,
}

#[derive(Debug, Serialize)]
pub struct MyAssignmentResponse {
    pub draw_completed: bool,
    pub receiver: Option<PersonRef>,
}

/// POST /api/v1/events/{id}/draw
pub async fn draw(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    match state.synchronizer().draw(event_id).await? {
        DrawOutcome::Drawn(views) => Ok(Json(DataResponse { data: views })),
        DrawOutcome::Infeasible(reason) => Err(reason.into()),
        DrawOutcome::RosterChanged => Err(CoreError::Conflict(
            "Participants changed during the draw. Please try again.".to_string(),
        )
        .into()),
    }
}

/// GET /api/v1/events/{id}/assignments
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<AssignmentsResponse>>> {
    let access = load_access(&state, event_id, &user).await?;
    access.require_organizer()?;

    let assignments = state.synchronizer().assignments(event_id).await?;
    Ok(Json(DataResponse {
        data: AssignmentsResponse {
            draw_completed: access.event.draw_completed,
            assignments,
        },
    }))
}

/// PUT /api/v1/events/{id}/assignments
///
/// Replaces the whole assignment set. Exclusion rules are not enforced.
pub async fn manual_edit(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
    Json(input): Json<ManualEditRequest>,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    match state
        .synchronizer()
        .commit_manual_edit(event_id, &input.assignments)
        .await?
    {
        EditOutcome::Applied(views) => Ok(Json(DataResponse { data: views })),
        EditOutcome::Rejected(rejection) => Err(rejection.into()),
        EditOutcome::RosterChanged => Err(CoreError::Conflict(
            "Participants changed while editing. Reload the assignments and try again."
                .to_string(),
        )
        .into()),
    }
}

/// DELETE /api/v1/events/{id}/assignments
pub async fn clear(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<StatusCode> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    state.synchronizer().clear(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/events/{id}/assignments/me
///
/// A participant only ever sees their own receiver.
pub async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<MyAssignmentResponse>>> {
    let access = load_access(&state, event_id, &user).await?;
    let roster = require_member(&state, &access).await?;

    let receiver = state
        .store
        .list_assignments(event_id)
        .await?
        .into_iter()
        .find(|p| p.giver_id == user.user_id)
        .map(|p| PersonRef {
            id: p.receiver_id,
            name: roster
                .iter()
                .find(|r| r.user_id == p.receiver_id)
                .map(|r| r.display_name.clone())
                .unwrap_or_default(),
        });

    Ok(Json(DataResponse {
        data: MyAssignmentResponse {
            draw_completed: access.event.draw_completed,
            receiver,
        },
    }))
}
