//! Handlers for exclusion rules. All routes are organizer-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use santa_core::error::CoreError;
use santa_core::exclusion::{ExclusionRule, RuleOutcome};
use santa_core::types::EventId;
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::load_access;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteRuleResponse {
    pub deleted: bool,
}

/// GET /api/v1/events/{id}/exclusions
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<DataResponse<Vec<ExclusionRule>>>> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;
    let rules = state.store.list_rules(event_id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/events/{id}/exclusions
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
    Json(rule): Json<ExclusionRule>,
) -> AppResult<(StatusCode, Json<DataResponse<ExclusionRule>>)> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    match state
        .synchronizer()
        .add_exclusion_rule(event_id, &rule)
        .await?
    {
        RuleOutcome::Added => {
            tracing::info!(
                event_id,
                giver_id = rule.giver_id,
                forbidden_receiver_id = rule.forbidden_receiver_id,
                "Exclusion rule added"
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
        }
        RuleOutcome::AlreadyExists => {
            Err(CoreError::Conflict("Rule already exists".to_string()).into())
        }
    }
}

/// DELETE /api/v1/events/{id}/exclusions?giver_id=..&forbidden_receiver_id=..
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<EventId>,
    Query(rule): Query<ExclusionRule>,
) -> AppResult<Json<DataResponse<DeleteRuleResponse>>> {
    load_access(&state, event_id, &user)
        .await?
        .require_organizer()?;

    let deleted = state.store.delete_rule(event_id, &rule).await?;
    if deleted {
        tracing::info!(
            event_id,
            giver_id = rule.giver_id,
            forbidden_receiver_id = rule.forbidden_receiver_id,
            "Exclusion rule deleted"
        );
    }
    Ok(Json(DataResponse {
        data: DeleteRuleResponse { deleted },
    }))
}
