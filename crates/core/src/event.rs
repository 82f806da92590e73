//! Event and participant types, join codes, and event input validation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EventId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Characters a join code is drawn from. `0` and `O` are left out so codes
/// can be read aloud without ambiguity.
pub const JOIN_CODE_ALPHABET: &[u8] = b"123456789ABCDEFGHIJKLMNPQRSTUVWXYZ";

/// Length of a join code.
pub const JOIN_CODE_LENGTH: usize = 9;

/// Maximum length of an event name.
const MAX_EVENT_NAME_LEN: usize = 200;

/// Maximum length of a participant display name.
const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Maximum length of an event description.
const MAX_DESCRIPTION_LEN: usize = 2000;

/// Maximum length of an event location.
const MAX_LOCATION_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An event as seen by the draw engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub id: EventId,
    pub name: String,
    pub organizer_id: UserId,
    pub join_code: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Suggested gift budget in whole currency units.
    pub budget: Option<i32>,
    pub event_date: Option<Timestamp>,
    pub draw_date: Option<Timestamp>,
    /// True iff a complete assignment set is stored for the event.
    pub draw_completed: bool,
    pub created_at: Timestamp,
}

/// A member of an event's roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub display_name: String,
}

/// Input for creating a new event. The organizer comes from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<i32>,
    #[serde(default)]
    pub event_date: Option<Timestamp>,
    #[serde(default)]
    pub draw_date: Option<Timestamp>,
}

impl NewEvent {
    /// A new event with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trim text fields; blank optional text becomes `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trim_optional(self.description),
            location: trim_optional(self.location),
            ..self
        }
    }
}

/// Partial update of an event's details. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub budget: Option<i32>,
    pub event_date: Option<Timestamp>,
    pub draw_date: Option<Timestamp>,
}

impl EventUpdate {
    /// Trim text fields; blank optional text is treated as not supplied.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            description: trim_optional(self.description),
            location: trim_optional(self.location),
            ..self
        }
    }

    /// The event's details as they would read after applying this update.
    pub fn merged_with(&self, current: &EventRecord) -> NewEvent {
        NewEvent {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            description: self.description.clone().or_else(|| current.description.clone()),
            location: self.location.clone().or_else(|| current.location.clone()),
            budget: self.budget.or(current.budget),
            event_date: self.event_date.or(current.event_date),
            draw_date: self.draw_date.or(current.draw_date),
        }
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Outcome of joining an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
    /// The event already has a completed draw; the roster is closed until
    /// the organizer clears it.
    AlreadyDrawn,
}

// ---------------------------------------------------------------------------
// Join codes
// ---------------------------------------------------------------------------

/// Generate a random join code of [`JOIN_CODE_LENGTH`] characters.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| JOIN_CODE_ALPHABET[rng.random_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize user-typed join code input: trim and uppercase.
pub fn normalize_join_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Validate the shape of a (normalized) join code.
pub fn validate_join_code(code: &str) -> Result<(), CoreError> {
    if code.len() != JOIN_CODE_LENGTH
        || !code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b))
    {
        return Err(CoreError::Validation("Invalid join code".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an event name: non-blank and at most `MAX_EVENT_NAME_LEN` chars.
pub fn validate_event_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Event name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_EVENT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Event name must not exceed {MAX_EVENT_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate every detail of an event about to be stored.
pub fn validate_event_details(input: &NewEvent) -> Result<(), CoreError> {
    validate_event_name(&input.name)?;
    if let Some(description) = &input.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Description must not exceed {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    if let Some(location) = &input.location {
        if location.chars().count() > MAX_LOCATION_LEN {
            return Err(CoreError::Validation(format!(
                "Location must not exceed {MAX_LOCATION_LEN} characters"
            )));
        }
    }
    if let Some(budget) = input.budget {
        if budget < 1 {
            return Err(CoreError::Validation(
                "Budget should be greater than 0".to_string(),
            ));
        }
    }
    if let (Some(draw_date), Some(event_date)) = (input.draw_date, input.event_date) {
        if draw_date > event_date {
            return Err(CoreError::Validation(
                "Draw date must not be after the event date".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validate a participant display name.
pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Display name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Display name must not exceed {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(())
}
