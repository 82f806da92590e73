//! Event entity model.

use santa_core::event::EventRecord;
use santa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventRow {
    pub id: DbId,
    pub name: String,
    pub organizer_id: DbId,
    pub join_code: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub budget: Option<i32>,
    pub event_date: Option<Timestamp>,
    pub draw_date: Option<Timestamp>,
    pub draw_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<EventRow> for EventRecord {
    fn from(row: EventRow) -> Self {
        EventRecord {
            id: row.id,
            name: row.name,
            organizer_id: row.organizer_id,
            join_code: row.join_code,
            description: row.description,
            location: row.location,
            budget: row.budget,
            event_date: row.event_date,
            draw_date: row.draw_date,
            draw_completed: row.draw_completed,
            created_at: row.created_at,
        }
    }
}
