//! Assignment model.

use santa_core::solver::AssignmentPair;
use santa_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `assignments` table (timestamps omitted).
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct AssignmentRow {
    pub event_id: DbId,
    pub giver_id: DbId,
    pub receiver_id: DbId,
}

impl From<AssignmentRow> for AssignmentPair {
    fn from(row: AssignmentRow) -> Self {
        AssignmentPair {
            giver_id: row.giver_id,
            receiver_id: row.receiver_id,
        }
    }
}
