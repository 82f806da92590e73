//! Repository for the `assignments` table.

use sqlx::PgPool;
use santa_core::solver::AssignmentPair;
use santa_core::types::{EventId, UserId};

use crate::models::assignment::AssignmentRow;

const COLUMNS: &str = "event_id, giver_id, receiver_id";

/// Provides data access for giver -> receiver assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// List assignments for an event, ordered by giver.
    pub async fn list(pool: &PgPool, event_id: EventId) -> Result<Vec<AssignmentRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assignments WHERE event_id = $1 ORDER BY giver_id");
        sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Upsert every pair, overwriting each giver's previous receiver.
    pub async fn upsert_all(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<(), sqlx::Error> {
        for pair in pairs {
            sqlx::query(
                "INSERT INTO assignments (event_id, giver_id, receiver_id) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (event_id, giver_id) \
                 DO UPDATE SET receiver_id = EXCLUDED.receiver_id",
            )
            .bind(event_id)
            .bind(pair.giver_id)
            .bind(pair.receiver_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Delete entries whose giver is not in `givers`.
    pub async fn delete_givers_not_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        givers: &[UserId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM assignments WHERE event_id = $1 AND NOT (giver_id = ANY($2))",
        )
        .bind(event_id)
        .bind(givers)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete entries naming `user_id` as giver or receiver.
    pub async fn delete_referencing(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM assignments \
             WHERE event_id = $1 AND (giver_id = $2 OR receiver_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete every entry for the event.
    pub async fn delete_all(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        event_id: EventId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assignments WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
