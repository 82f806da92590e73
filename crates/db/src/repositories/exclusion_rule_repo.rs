//! Repository for the `exclusion_rules` table.

use sqlx::PgPool;
use santa_core::types::{EventId, UserId};

use crate::models::exclusion_rule::ExclusionRuleRow;

const COLUMNS: &str = "id, event_id, giver_id, forbidden_receiver_id, created_at";

/// Provides data access for exclusion rules.
pub struct ExclusionRuleRepo;

impl ExclusionRuleRepo {
    /// List rules for an event in insertion order.
    pub async fn list(
        pool: &PgPool,
        event_id: EventId,
    ) -> Result<Vec<ExclusionRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exclusion_rules WHERE event_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, ExclusionRuleRow>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a rule. Returns `false` if the same rule already exists.
    pub async fn insert(
        pool: &PgPool,
        event_id: EventId,
        giver_id: UserId,
        forbidden_receiver_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO exclusion_rules (event_id, giver_id, forbidden_receiver_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (event_id, giver_id, forbidden_receiver_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(giver_id)
        .bind(forbidden_receiver_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a rule. Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &PgPool,
        event_id: EventId,
        giver_id: UserId,
        forbidden_receiver_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM exclusion_rules \
             WHERE event_id = $1 AND giver_id = $2 AND forbidden_receiver_id = $3",
        )
        .bind(event_id)
        .bind(giver_id)
        .bind(forbidden_receiver_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every rule naming `user_id` as giver or forbidden receiver.
    pub async fn delete_referencing(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM exclusion_rules \
             WHERE event_id = $1 AND (giver_id = $2 OR forbidden_receiver_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
