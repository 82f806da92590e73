//! Caller-role checks for event operations.
//!
//! The HTTP layer authenticates the caller and loads the event; the checks
//! here decide what that caller may do with it. Nothing in the draw engine
//! looks at credentials itself.

use crate::error::CoreError;
use crate::event::EventRecord;
use crate::types::{EventId, UserId};

/// An event paired with the authenticated user acting on it.
#[derive(Debug, Clone)]
pub struct EventAccess {
    pub event: EventRecord,
    pub caller_id: UserId,
}

impl EventAccess {
    pub fn new(event: EventRecord, caller_id: UserId) -> Self {
        Self { event, caller_id }
    }

    pub fn event_id(&self) -> EventId {
        self.event.id
    }

    pub fn is_organizer(&self) -> bool {
        self.event.organizer_id == self.caller_id
    }

    /// Only the organizer may draw, edit, clear, or manage exclusion rules.
    pub fn require_organizer(&self) -> Result<(), CoreError> {
        if !self.is_organizer() {
            return Err(CoreError::Forbidden(
                "Only the event organizer can perform this action".to_string(),
            ));
        }
        Ok(())
    }

    /// The organizer may remove anyone but themself; a participant may only
    /// remove themself.
    pub fn require_can_remove(&self, participant_id: UserId) -> Result<(), CoreError> {
        if !self.is_organizer() && participant_id != self.caller_id {
            return Err(CoreError::Forbidden(
                "Only the organizer can remove other participants".to_string(),
            ));
        }
        if participant_id == self.event.organizer_id {
            return Err(CoreError::Validation(
                "Cannot remove organizer from event".to_string(),
            ));
        }
        Ok(())
    }
}
