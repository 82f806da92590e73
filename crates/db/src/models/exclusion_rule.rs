//! Exclusion rule model.

use santa_core::exclusion::ExclusionRule;
use santa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `exclusion_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExclusionRuleRow {
    pub id: DbId,
    pub event_id: DbId,
    pub giver_id: DbId,
    pub forbidden_receiver_id: DbId,
    pub created_at: Timestamp,
}

impl From<ExclusionRuleRow> for ExclusionRule {
    fn from(row: ExclusionRuleRow) -> Self {
        ExclusionRule::new(row.giver_id, row.forbidden_receiver_id)
    }
}
