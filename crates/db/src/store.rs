//! [`EventStore`] backed by PostgreSQL.
//!
//! Each assignment write, and each join, runs in one transaction that starts
//! by locking the event row, so concurrent draws, edits, clears, joins, and
//! removals on the same event are serialized and never interleave.

use std::collections::HashSet;

use async_trait::async_trait;
use santa_core::error::StoreError;
use santa_core::event::{EventRecord, EventUpdate, JoinOutcome, NewEvent, Participant};
use santa_core::exclusion::{ExclusionRule, RuleOutcome};
use santa_core::solver::AssignmentPair;
use santa_core::store::{
    plan_covers_roster, CommitApplied, EventStore, RedrawPlan, RemovalApplied,
};
use santa_core::types::{EventId, UserId};
use sqlx::PgPool;

use crate::repositories::{AssignmentRepo, EventRepo, ExclusionRuleRepo, ParticipantRepo};

/// How an assignment write treats the rows already stored.
#[derive(Debug, Clone, Copy)]
enum WriteMode {
    /// Upsert by giver and drop givers missing from the new set.
    Upsert,
    /// Delete everything first, then insert.
    Replace,
}

#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Store `pairs` and set `draw_completed`. `None` if the event is gone.
    async fn write_assignments(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
        mode: WriteMode,
    ) -> Result<Option<CommitApplied>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        if EventRepo::lock(&mut tx, event_id).await?.is_none() {
            return Ok(None);
        }

        let roster = roster_ids(&mut tx, event_id).await?;
        if !plan_covers_roster(pairs, &roster) {
            tx.rollback().await?;
            return Ok(Some(CommitApplied::RosterChanged));
        }

        match mode {
            WriteMode::Upsert => {
                let givers: Vec<UserId> = pairs.iter().map(|p| p.giver_id).collect();
                AssignmentRepo::delete_givers_not_in(&mut tx, event_id, &givers).await?;
            }
            WriteMode::Replace => {
                AssignmentRepo::delete_all(&mut tx, event_id).await?;
            }
        }
        AssignmentRepo::upsert_all(&mut tx, event_id, pairs).await?;
        EventRepo::set_draw_completed(&mut tx, event_id, true).await?;

        tx.commit().await?;
        Ok(Some(CommitApplied::Stored))
    }

    async fn clear_tx(&self, event_id: EventId) -> Result<Option<()>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        if EventRepo::lock(&mut tx, event_id).await?.is_none() {
            return Ok(None);
        }
        AssignmentRepo::delete_all(&mut tx, event_id).await?;
        EventRepo::set_draw_completed(&mut tx, event_id, false).await?;
        tx.commit().await?;
        Ok(Some(()))
    }

    async fn create_event_tx(
        &self,
        input: &NewEvent,
        organizer: &Participant,
        join_code: &str,
    ) -> Result<EventRecord, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let row = EventRepo::create(&mut tx, input, organizer.user_id, join_code).await?;
        ParticipantRepo::insert(&mut tx, row.id, organizer.user_id, &organizer.display_name)
            .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn join_event_tx(
        &self,
        event_id: EventId,
        participant: &Participant,
    ) -> Result<Option<JoinOutcome>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let Some(event) = EventRepo::lock(&mut tx, event_id).await? else {
            return Ok(None);
        };
        if event.draw_completed {
            let roster = roster_ids(&mut tx, event_id).await?;
            tx.rollback().await?;
            return Ok(Some(if roster.contains(&participant.user_id) {
                JoinOutcome::AlreadyMember
            } else {
                JoinOutcome::AlreadyDrawn
            }));
        }
        let inserted = ParticipantRepo::insert(
            &mut tx,
            event_id,
            participant.user_id,
            &participant.display_name,
        )
        .await?;
        tx.commit().await?;

        Ok(Some(if inserted {
            JoinOutcome::Joined
        } else {
            JoinOutcome::AlreadyMember
        }))
    }

    async fn remove_participant_tx(
        &self,
        event_id: EventId,
        participant_id: UserId,
        plan: &RedrawPlan,
    ) -> Result<Option<RemovalApplied>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let Some(event) = EventRepo::lock(&mut tx, event_id).await? else {
            return Ok(None);
        };

        // Rules and assignments are deleted explicitly first; the foreign
        // keys would cascade them anyway.
        let rules = ExclusionRuleRepo::delete_referencing(&mut tx, event_id, participant_id).await?;
        AssignmentRepo::delete_referencing(&mut tx, event_id, participant_id).await?;
        if !ParticipantRepo::delete(&mut tx, event_id, participant_id).await? {
            tx.rollback().await?;
            return Ok(Some(RemovalApplied::NotMember));
        }
        tracing::debug!(event_id, participant_id, rules, "Deleted membership and rules");

        if !event.draw_completed {
            tx.commit().await?;
            return Ok(Some(RemovalApplied::Removed {
                was_drawn: false,
                redraw_committed: false,
            }));
        }

        let roster = roster_ids(&mut tx, event_id).await?;
        AssignmentRepo::delete_all(&mut tx, event_id).await?;
        let redraw_committed = match plan {
            RedrawPlan::Commit(pairs) if plan_covers_roster(pairs, &roster) => {
                AssignmentRepo::upsert_all(&mut tx, event_id, pairs).await?;
                true
            }
            _ => {
                EventRepo::set_draw_completed(&mut tx, event_id, false).await?;
                false
            }
        };

        tx.commit().await?;
        Ok(Some(RemovalApplied::Removed {
            was_drawn: true,
            redraw_committed,
        }))
    }
}

/// Member ids as seen inside `tx`.
async fn roster_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event_id: EventId,
) -> Result<HashSet<UserId>, sqlx::Error> {
    Ok(ParticipantRepo::list_ids(tx, event_id)
        .await?
        .into_iter()
        .collect())
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(
        &self,
        input: &NewEvent,
        organizer: &Participant,
        join_code: &str,
    ) -> Result<EventRecord, StoreError> {
        self.create_event_tx(input, organizer, join_code)
            .await
            .map_err(StoreError::backend)
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StoreError> {
        let row = EventRepo::find_by_id(&self.pool, event_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Into::into))
    }

    async fn find_event_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<EventRecord>, StoreError> {
        let row = EventRepo::find_by_join_code(&self.pool, join_code)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Into::into))
    }

    async fn update_event(
        &self,
        event_id: EventId,
        update: &EventUpdate,
    ) -> Result<Option<EventRecord>, StoreError> {
        let row = EventRepo::update(&self.pool, event_id, update)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(Into::into))
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError> {
        EventRepo::delete(&self.pool, event_id)
            .await
            .map_err(StoreError::backend)
    }

    async fn join_event(
        &self,
        event_id: EventId,
        participant: &Participant,
    ) -> Result<JoinOutcome, StoreError> {
        self.join_event_tx(event_id, participant)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    async fn list_participants(&self, event_id: EventId) -> Result<Vec<Participant>, StoreError> {
        let rows = ParticipantRepo::list(&self.pool, event_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_rules(&self, event_id: EventId) -> Result<Vec<ExclusionRule>, StoreError> {
        let rows = ExclusionRuleRepo::list(&self.pool, event_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<RuleOutcome, StoreError> {
        let inserted = ExclusionRuleRepo::insert(
            &self.pool,
            event_id,
            rule.giver_id,
            rule.forbidden_receiver_id,
        )
        .await
        .map_err(StoreError::backend)?;
        Ok(if inserted {
            RuleOutcome::Added
        } else {
            RuleOutcome::AlreadyExists
        })
    }

    async fn delete_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<bool, StoreError> {
        ExclusionRuleRepo::delete(
            &self.pool,
            event_id,
            rule.giver_id,
            rule.forbidden_receiver_id,
        )
        .await
        .map_err(StoreError::backend)
    }

    async fn list_assignments(
        &self,
        event_id: EventId,
    ) -> Result<Vec<AssignmentPair>, StoreError> {
        let rows = AssignmentRepo::list(&self.pool, event_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn commit_draw(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError> {
        self.write_assignments(event_id, pairs, WriteMode::Upsert)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    async fn replace_assignments(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError> {
        self.write_assignments(event_id, pairs, WriteMode::Replace)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    async fn clear_assignments(&self, event_id: EventId) -> Result<(), StoreError> {
        self.clear_tx(event_id)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    async fn remove_participant(
        &self,
        event_id: EventId,
        participant_id: UserId,
        plan: &RedrawPlan,
    ) -> Result<RemovalApplied, StoreError> {
        self.remove_participant_tx(event_id, participant_id, plan)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::EventNotFound(event_id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(StoreError::backend)
    }
}
