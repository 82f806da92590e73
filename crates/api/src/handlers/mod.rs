pub mod assignments;
pub mod events;
pub mod exclusions;
pub mod participants;

use santa_core::access::EventAccess;
use santa_core::error::CoreError;
use santa_core::event::Participant;
use santa_core::types::EventId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load an event and pair it with the calling user.
pub(crate) async fn load_access(
    state: &AppState,
    event_id: EventId,
    user: &AuthUser,
) -> AppResult<EventAccess> {
    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        })?;
    Ok(EventAccess::new(event, user.user_id))
}

/// Load the roster, failing with `Forbidden` unless the caller is on it.
pub(crate) async fn require_member(
    state: &AppState,
    access: &EventAccess,
) -> AppResult<Vec<Participant>> {
    let roster = state.store.list_participants(access.event_id()).await?;
    if !roster.iter().any(|p| p.user_id == access.caller_id) {
        return Err(CoreError::Forbidden(
            "You are not a participant in this event".to_string(),
        )
        .into());
    }
    Ok(roster)
}
