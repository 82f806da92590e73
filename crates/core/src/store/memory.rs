//! In-memory [`EventStore`].
//!
//! All state sits behind one `RwLock`; every write method holds the write
//! guard for its whole body, which makes each call atomic with respect to
//! every other call. Used by tests and by the `memory` backend for local
//! development.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{plan_covers_roster, CommitApplied, EventStore, RedrawPlan, RemovalApplied};
use crate::error::StoreError;
use crate::event::{EventRecord, EventUpdate, JoinOutcome, NewEvent, Participant};
use crate::exclusion::{ExclusionRule, RuleOutcome};
use crate::solver::AssignmentPair;
use crate::types::{EventId, UserId};

#[derive(Debug)]
struct EventState {
    record: EventRecord,
    /// Roster in join order.
    participants: Vec<Participant>,
    /// Rules in insertion order, without duplicates.
    rules: Vec<ExclusionRule>,
    /// giver -> receiver
    assignments: BTreeMap<UserId, UserId>,
}

impl EventState {
    fn roster_ids(&self) -> HashSet<UserId> {
        self.participants.iter().map(|p| p.user_id).collect()
    }

    /// Store `pairs` only if they still cover the roster.
    fn commit_pairs(&mut self, pairs: &[AssignmentPair]) -> CommitApplied {
        if !plan_covers_roster(pairs, &self.roster_ids()) {
            return CommitApplied::RosterChanged;
        }
        self.store_pairs(pairs);
        CommitApplied::Stored
    }

    fn store_pairs(&mut self, pairs: &[AssignmentPair]) {
        self.assignments = pairs.iter().map(|p| (p.giver_id, p.receiver_id)).collect();
        self.record.draw_completed = true;
    }

    fn clear(&mut self) {
        self.assignments.clear();
        self.record.draw_completed = false;
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_event_id: EventId,
    events: HashMap<EventId, EventState>,
}

impl Inner {
    fn event_mut(&mut self, event_id: EventId) -> Result<&mut EventState, StoreError> {
        self.events
            .get_mut(&event_id)
            .ok_or(StoreError::EventNotFound(event_id))
    }

    fn event(&self, event_id: EventId) -> Result<&EventState, StoreError> {
        self.events
            .get(&event_id)
            .ok_or(StoreError::EventNotFound(event_id))
    }
}

/// Process-local event store.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    inner: RwLock<Inner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create_event(
        &self,
        input: &NewEvent,
        organizer: &Participant,
        join_code: &str,
    ) -> Result<EventRecord, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_event_id += 1;
        let record = EventRecord {
            id: inner.next_event_id,
            name: input.name.trim().to_string(),
            organizer_id: organizer.user_id,
            join_code: join_code.to_string(),
            description: input.description.clone(),
            location: input.location.clone(),
            budget: input.budget,
            event_date: input.event_date,
            draw_date: input.draw_date,
            draw_completed: false,
            created_at: chrono::Utc::now(),
        };
        inner.events.insert(
            record.id,
            EventState {
                record: record.clone(),
                participants: vec![organizer.clone()],
                rules: Vec::new(),
                assignments: BTreeMap::new(),
            },
        );
        Ok(record)
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.events.get(&event_id).map(|e| e.record.clone()))
    }

    async fn find_event_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<EventRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .values()
            .find(|e| e.record.join_code == join_code)
            .map(|e| e.record.clone()))
    }

    async fn update_event(
        &self,
        event_id: EventId,
        update: &EventUpdate,
    ) -> Result<Option<EventRecord>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(state) = inner.events.get_mut(&event_id) else {
            return Ok(None);
        };
        let record = &mut state.record;
        if let Some(name) = &update.name {
            record.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            record.description = Some(description.clone());
        }
        if let Some(location) = &update.location {
            record.location = Some(location.clone());
        }
        record.budget = update.budget.or(record.budget);
        record.event_date = update.event_date.or(record.event_date);
        record.draw_date = update.draw_date.or(record.draw_date);
        Ok(Some(record.clone()))
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.events.remove(&event_id).is_some())
    }

    async fn join_event(
        &self,
        event_id: EventId,
        participant: &Participant,
    ) -> Result<JoinOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let state = inner.event_mut(event_id)?;
        if state
            .participants
            .iter()
            .any(|p| p.user_id == participant.user_id)
        {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if state.record.draw_completed {
            return Ok(JoinOutcome::AlreadyDrawn);
        }
        state.participants.push(participant.clone());
        Ok(JoinOutcome::Joined)
    }

    async fn list_participants(&self, event_id: EventId) -> Result<Vec<Participant>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.event(event_id)?.participants.clone())
    }

    async fn list_rules(&self, event_id: EventId) -> Result<Vec<ExclusionRule>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.event(event_id)?.rules.clone())
    }

    async fn add_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<RuleOutcome, StoreError> {
        let mut inner = self.inner.write().await;
        let state = inner.event_mut(event_id)?;
        if state.rules.contains(rule) {
            return Ok(RuleOutcome::AlreadyExists);
        }
        state.rules.push(*rule);
        Ok(RuleOutcome::Added)
    }

    async fn delete_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let state = inner.event_mut(event_id)?;
        let before = state.rules.len();
        state.rules.retain(|r| r != rule);
        Ok(state.rules.len() < before)
    }

    async fn list_assignments(
        &self,
        event_id: EventId,
    ) -> Result<Vec<AssignmentPair>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .event(event_id)?
            .assignments
            .iter()
            .map(|(&giver_id, &receiver_id)| AssignmentPair {
                giver_id,
                receiver_id,
            })
            .collect())
    }

    async fn commit_draw(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.event_mut(event_id)?.commit_pairs(pairs))
    }

    async fn replace_assignments(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.event_mut(event_id)?.commit_pairs(pairs))
    }

    async fn clear_assignments(&self, event_id: EventId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.event_mut(event_id)?.clear();
        Ok(())
    }

    async fn remove_participant(
        &self,
        event_id: EventId,
        participant_id: UserId,
        plan: &RedrawPlan,
    ) -> Result<RemovalApplied, StoreError> {
        let mut inner = self.inner.write().await;
        let state = inner.event_mut(event_id)?;

        let Some(pos) = state
            .participants
            .iter()
            .position(|p| p.user_id == participant_id)
        else {
            return Ok(RemovalApplied::NotMember);
        };
        state.participants.remove(pos);
        state.rules.retain(|r| !r.references(participant_id));
        state
            .assignments
            .retain(|&giver, &mut receiver| giver != participant_id && receiver != participant_id);

        let was_drawn = state.record.draw_completed;
        if !was_drawn {
            return Ok(RemovalApplied::Removed {
                was_drawn,
                redraw_committed: false,
            });
        }

        let roster = state.roster_ids();
        let redraw_committed = match plan {
            RedrawPlan::Commit(pairs) if plan_covers_roster(pairs, &roster) => {
                state.store_pairs(pairs);
                true
            }
            _ => {
                state.clear();
                false
            }
        };

        Ok(RemovalApplied::Removed {
            was_drawn,
            redraw_committed,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
