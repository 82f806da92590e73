//! Event membership model.

use santa_core::event::Participant;
use santa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `event_participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantRow {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub joined_at: Timestamp,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            user_id: row.user_id,
            display_name: row.display_name,
        }
    }
}
