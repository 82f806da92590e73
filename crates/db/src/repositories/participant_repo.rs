//! Repository for the `event_participants` table.

use sqlx::PgPool;
use santa_core::types::{EventId, UserId};

use crate::models::participant::ParticipantRow;

const COLUMNS: &str = "id, event_id, user_id, display_name, joined_at";

/// Provides data access for event membership.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Add a member. Returns `false` if the user had already joined.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        user_id: UserId,
        display_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO event_participants (event_id, user_id, display_name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(display_name)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List members in join order.
    pub async fn list(pool: &PgPool, event_id: EventId) -> Result<Vec<ParticipantRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_participants \
             WHERE event_id = $1 \
             ORDER BY joined_at, id"
        );
        sqlx::query_as::<_, ParticipantRow>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Member ids as seen inside a transaction.
    pub async fn list_ids(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
    ) -> Result<Vec<UserId>, sqlx::Error> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM event_participants WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Remove a member. Returns `true` if a row was deleted.
    ///
    /// Rules and assignments naming the member go with it through the
    /// `ON DELETE CASCADE` foreign keys.
    pub async fn delete(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM event_participants WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
