//! Repository for the `events` table.

use santa_core::event::{EventUpdate, NewEvent};
use santa_core::types::{DbId, EventId};
use sqlx::PgPool;

use crate::models::event::EventRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, organizer_id, join_code, description, location, budget, \
                       event_date, draw_date, draw_completed, created_at, updated_at";

/// Provides data access for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewEvent,
        organizer_id: DbId,
        join_code: &str,
    ) -> Result<EventRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                (name, organizer_id, join_code, description, location, budget, \
                 event_date, draw_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(input.name.trim())
            .bind(organizer_id)
            .bind(join_code)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.budget)
            .bind(input.event_date)
            .bind(input.draw_date)
            .fetch_one(&mut **tx)
            .await
    }

    /// Update an event's details. Only non-`None` fields in `input` are
    /// applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: EventId,
        input: &EventUpdate,
    ) -> Result<Option<EventRow>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                location = COALESCE($4, location), \
                budget = COALESCE($5, budget), \
                event_date = COALESCE($6, event_date), \
                draw_date = COALESCE($7, draw_date), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.budget)
            .bind(input.event_date)
            .bind(input.draw_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event. Its roster, rules, and assignments cascade.
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: EventId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find an event by ID.
    pub async fn find_by_id(pool: &PgPool, id: EventId) -> Result<Option<EventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event by its (already normalized) join code.
    pub async fn find_by_join_code(
        pool: &PgPool,
        join_code: &str,
    ) -> Result<Option<EventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE join_code = $1");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(join_code)
            .fetch_optional(pool)
            .await
    }

    /// Lock the event row for the rest of the transaction.
    ///
    /// Every assignment write takes this lock first, so writers for the same
    /// event are serialized.
    pub async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: EventId,
    ) -> Result<Option<EventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set the `draw_completed` flag.
    pub async fn set_draw_completed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: EventId,
        draw_completed: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE events SET draw_completed = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(draw_completed)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
