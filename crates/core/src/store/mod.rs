//! Storage seam for events, rosters, exclusion rules, and assignments.
//!
//! Every method that changes the assignment set or the `draw_completed` flag
//! is atomic: an implementation must apply it as one transaction so readers
//! never observe a half-replaced assignment set or a flag that disagrees with
//! the stored entries.

pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::event::{EventRecord, EventUpdate, JoinOutcome, NewEvent, Participant};
use crate::exclusion::{ExclusionRule, RuleOutcome};
use crate::solver::AssignmentPair;
use crate::types::{EventId, UserId};

pub use memory::MemoryEventStore;

/// What to do with the assignment set when removing a participant from an
/// event whose draw is completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawPlan {
    /// Delete every assignment and reset `draw_completed`.
    Clear,
    /// Replace the assignment set with these pairs, computed over the roster
    /// without the removed participant.
    Commit(Vec<AssignmentPair>),
}

/// What `commit_draw` or `replace_assignments` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitApplied {
    /// The pairs were stored and `draw_completed` set.
    Stored,
    /// The pairs do not cover the roster as it stands at commit time (someone
    /// joined or left after the pairs were computed). Nothing was written.
    RosterChanged,
}

/// What `remove_participant` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalApplied {
    /// The user was not a member; nothing changed.
    NotMember,
    Removed {
        /// `draw_completed` as it was before the removal.
        was_drawn: bool,
        /// `true` if a [`RedrawPlan::Commit`] was stored. `false` when the
        /// plan was `Clear`, the event was not drawn, or the roster changed
        /// under the plan and the assignments were cleared instead.
        redraw_committed: bool,
    },
}

#[async_trait]
pub trait EventStore: Send + Sync {
    // --- Events and roster ---

    /// Create an event and add the organizer as its first participant.
    async fn create_event(
        &self,
        input: &NewEvent,
        organizer: &Participant,
        join_code: &str,
    ) -> Result<EventRecord, StoreError>;

    async fn find_event(&self, event_id: EventId) -> Result<Option<EventRecord>, StoreError>;

    async fn find_event_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<EventRecord>, StoreError>;

    /// Apply the `Some` fields of `update`. `None` if the event is gone.
    async fn update_event(
        &self,
        event_id: EventId,
        update: &EventUpdate,
    ) -> Result<Option<EventRecord>, StoreError>;

    /// Delete an event with its roster, rules, and assignments. Returns
    /// `true` if the event existed.
    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError>;

    /// Add a participant. Joining twice is a no-op. Checked under the same
    /// lock as assignment writes: a non-member joining a drawn event gets
    /// [`JoinOutcome::AlreadyDrawn`] and the roster is left alone.
    async fn join_event(
        &self,
        event_id: EventId,
        participant: &Participant,
    ) -> Result<JoinOutcome, StoreError>;

    /// Current roster in join order.
    async fn list_participants(&self, event_id: EventId) -> Result<Vec<Participant>, StoreError>;

    // --- Exclusion rules ---

    async fn list_rules(&self, event_id: EventId) -> Result<Vec<ExclusionRule>, StoreError>;

    /// Insert a rule; inserting an existing rule is a no-op.
    async fn add_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<RuleOutcome, StoreError>;

    /// Returns `true` if a rule was deleted.
    async fn delete_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<bool, StoreError>;

    // --- Assignments (atomic) ---

    async fn list_assignments(&self, event_id: EventId)
        -> Result<Vec<AssignmentPair>, StoreError>;

    /// Set `draw_completed` and upsert every pair, overwriting the prior
    /// receiver of each giver. Entries for givers absent from `pairs` are
    /// dropped so the stored set stays a bijection. Refused with
    /// [`CommitApplied::RosterChanged`] unless `pairs` covers the current
    /// roster exactly.
    async fn commit_draw(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError>;

    /// Delete all entries, insert `pairs`, and set `draw_completed`. Same
    /// roster check as [`commit_draw`](EventStore::commit_draw).
    async fn replace_assignments(
        &self,
        event_id: EventId,
        pairs: &[AssignmentPair],
    ) -> Result<CommitApplied, StoreError>;

    /// Delete all entries and reset `draw_completed`.
    async fn clear_assignments(&self, event_id: EventId) -> Result<(), StoreError>;

    /// Remove a participant in one transaction: delete the membership (stop
    /// if there was none), delete every rule naming the participant in either
    /// role, and if the event was drawn apply `plan`.
    async fn remove_participant(
        &self,
        event_id: EventId,
        participant_id: UserId,
        plan: &RedrawPlan,
    ) -> Result<RemovalApplied, StoreError>;

    // --- Health ---

    /// Round-trip to the backend.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// `true` if `pairs` is a bijection over exactly `roster`. Stores check this
/// inside every assignment write to refuse pairs computed over a roster that
/// has since changed.
pub fn plan_covers_roster(pairs: &[AssignmentPair], roster: &HashSet<UserId>) -> bool {
    let givers: HashSet<UserId> = pairs.iter().map(|p| p.giver_id).collect();
    let receivers: HashSet<UserId> = pairs.iter().map(|p| p.receiver_id).collect();
    pairs.len() == roster.len() && givers == *roster && receivers == *roster
}
