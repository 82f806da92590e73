//! Draw orchestration: applies solver results and manual edits to an
//! [`EventStore`], and reconciles assignments when a participant leaves.
//!
//! Expected failures (infeasible constraints, rejected edits, a redraw that
//! could not be satisfied) come back as outcome values. `Err` is reserved for
//! missing events, tampered payloads, and storage faults.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::event::Participant;
use crate::exclusion::{validate_rule, ExclusionIndex, ExclusionRule, RuleOutcome};
use crate::manual_edit::{self, EditRejection};
use crate::solver::{
    solve_with_options, Assignment, AssignmentPair, Infeasible, SolveOptions,
    DEFAULT_MAX_SEARCH_STEPS,
};
use crate::store::{CommitApplied, EventStore, RedrawPlan, RemovalApplied};
use crate::types::{EventId, UserId};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Solver settings applied to every draw and redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawConfig {
    /// Shuffle candidate order per draw so outcomes are not predictable.
    pub shuffle: bool,
    /// Search budget; exhausting it reports the draw as infeasible.
    pub max_search_steps: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            shuffle: true,
            max_search_steps: Some(DEFAULT_MAX_SEARCH_STEPS),
        }
    }
}

impl DrawConfig {
    fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            shuffle: self.shuffle,
            max_steps: self.max_search_steps,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation types
// ---------------------------------------------------------------------------

/// A participant reference carrying the display name for presentation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PersonRef {
    pub id: UserId,
    pub name: String,
}

/// One assignment entry as shown to the organizer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssignmentView {
    pub giver: PersonRef,
    pub receiver: PersonRef,
}

/// Attach display names to `pairs` and sort by giver name.
///
/// Ids missing from `roster` render with an empty name.
pub fn present(pairs: &[AssignmentPair], roster: &[Participant]) -> Vec<AssignmentView> {
    let names: HashMap<UserId, &str> = roster
        .iter()
        .map(|p| (p.user_id, p.display_name.as_str()))
        .collect();
    let person = |id: UserId| PersonRef {
        id,
        name: names.get(&id).copied().unwrap_or_default().to_string(),
    };

    let mut views: Vec<AssignmentView> = pairs
        .iter()
        .map(|p| AssignmentView {
            giver: person(p.giver_id),
            receiver: person(p.receiver_id),
        })
        .collect();
    views.sort_by(|a, b| {
        a.giver
            .name
            .cmp(&b.giver.name)
            .then(a.giver.id.cmp(&b.giver.id))
    });
    views
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn(Vec<AssignmentView>),
    Infeasible(Infeasible),
    /// Someone joined or left while the draw was computed. Nothing was
    /// stored; drawing again uses the new roster.
    RosterChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(Vec<AssignmentView>),
    Rejected(EditRejection),
    /// The roster changed between validation and commit. Nothing was stored.
    RosterChanged,
}

/// What happened to the assignment set during a participant removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawResult {
    /// The event had no completed draw, or the user was not a member.
    NotNeeded,
    /// Assignments were cleared without attempting a redraw.
    Cleared,
    /// A fresh assignment over the remaining roster was committed.
    Redrawn(Vec<AssignmentView>),
    /// The redraw could not be satisfied; assignments were cleared.
    FailedAndCleared(Infeasible),
    /// A redraw was computed, but the roster changed again before it could
    /// be stored; assignments were cleared instead.
    RosterChanged,
}

/// Combined result of a removal. The removal itself and the redraw are
/// reported separately: a failed redraw does not undo the removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// `false` if the user was not a member (nothing changed).
    pub removed: bool,
    pub redraw: RedrawResult,
}

// ---------------------------------------------------------------------------
// Pure draw
// ---------------------------------------------------------------------------

/// Build the exclusion index and solve over `roster` in join order.
pub fn compute_draw(
    roster: &[Participant],
    rules: &[ExclusionRule],
    config: &DrawConfig,
) -> Result<Assignment, Infeasible> {
    let ids: Vec<UserId> = roster.iter().map(|p| p.user_id).collect();
    let index = ExclusionIndex::build(rules);
    solve_with_options(&ids, &index, &config.solve_options())
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Applies draws, edits, clears, and removals through an [`EventStore`],
/// keeping `draw_completed` and the assignment set consistent.
///
/// Callers must have authorized the acting user (see
/// [`EventAccess`](crate::access::EventAccess)) before invoking anything here.
pub struct DrawSynchronizer<'a> {
    store: &'a dyn EventStore,
    config: DrawConfig,
}

impl<'a> DrawSynchronizer<'a> {
    pub fn new(store: &'a dyn EventStore, config: DrawConfig) -> Self {
        Self { store, config }
    }

    /// Run a full draw for the event and commit it on success.
    ///
    /// An infeasible draw writes nothing.
    pub async fn draw(&self, event_id: EventId) -> Result<DrawOutcome, CoreError> {
        let roster = self.store.list_participants(event_id).await?;
        let rules = self.store.list_rules(event_id).await?;

        match compute_draw(&roster, &rules, &self.config) {
            Ok(assignment) => {
                let applied = self.commit_draw(event_id, &assignment).await?;
                if applied == CommitApplied::RosterChanged {
                    tracing::warn!(event_id, "Roster changed during draw, nothing stored");
                    return Ok(DrawOutcome::RosterChanged);
                }
                tracing::info!(
                    event_id,
                    participants = roster.len(),
                    rules = rules.len(),
                    "Draw committed"
                );
                Ok(DrawOutcome::Drawn(present(assignment.pairs(), &roster)))
            }
            Err(reason) => {
                tracing::info!(
                    event_id,
                    participants = roster.len(),
                    rules = rules.len(),
                    ?reason,
                    "Draw infeasible"
                );
                Ok(DrawOutcome::Infeasible(reason))
            }
        }
    }

    /// Mark the event drawn and upsert every pair, atomically. Refused when
    /// the assignment no longer covers the roster.
    pub async fn commit_draw(
        &self,
        event_id: EventId,
        assignment: &Assignment,
    ) -> Result<CommitApplied, CoreError> {
        Ok(self.store.commit_draw(event_id, assignment.pairs()).await?)
    }

    /// Validate an organizer-supplied assignment and, if valid, replace the
    /// stored set with it.
    ///
    /// A proposal naming non-participants is treated as a forged request and
    /// fails with [`CoreError::Forbidden`]; other rejections are returned as
    /// [`EditOutcome::Rejected`]. Exclusion rules are deliberately not
    /// enforced on manual edits.
    pub async fn commit_manual_edit(
        &self,
        event_id: EventId,
        proposal: &[AssignmentPair],
    ) -> Result<EditOutcome, CoreError> {
        let roster = self.store.list_participants(event_id).await?;

        if let Err(rejection) = manual_edit::validate(proposal, &roster) {
            if rejection.is_protocol_violation() {
                tracing::warn!(event_id, "Manual edit referenced non-participant users");
                return Err(CoreError::Forbidden(rejection.to_string()));
            }
            tracing::debug!(event_id, %rejection, "Manual edit rejected");
            return Ok(EditOutcome::Rejected(rejection));
        }

        let applied = self.store.replace_assignments(event_id, proposal).await?;
        if applied == CommitApplied::RosterChanged {
            tracing::warn!(event_id, "Roster changed during manual edit, nothing stored");
            return Ok(EditOutcome::RosterChanged);
        }
        tracing::info!(event_id, entries = proposal.len(), "Manual edit applied");
        Ok(EditOutcome::Applied(present(proposal, &roster)))
    }

    /// Delete every assignment and reset `draw_completed`, atomically.
    pub async fn clear(&self, event_id: EventId) -> Result<(), CoreError> {
        self.store.clear_assignments(event_id).await?;
        tracing::info!(event_id, "Assignments cleared");
        Ok(())
    }

    /// Current assignments with display names, sorted by giver name.
    pub async fn assignments(&self, event_id: EventId) -> Result<Vec<AssignmentView>, CoreError> {
        let roster = self.store.list_participants(event_id).await?;
        let pairs = self.store.list_assignments(event_id).await?;
        Ok(present(&pairs, &roster))
    }

    /// Add an exclusion rule after checking both users are participants.
    pub async fn add_exclusion_rule(
        &self,
        event_id: EventId,
        rule: &ExclusionRule,
    ) -> Result<RuleOutcome, CoreError> {
        let roster = self.store.list_participants(event_id).await?;
        let ids = roster.iter().map(|p| p.user_id).collect();
        validate_rule(rule, &ids)?;
        Ok(self.store.add_rule(event_id, rule).await?)
    }

    /// Remove a participant and reconcile the assignment set.
    ///
    /// Rules naming the participant are deleted in both directions. If the
    /// event was drawn, the assignments are either recomputed over the
    /// remaining roster (`auto_redraw`) or cleared. A redraw that cannot be
    /// satisfied falls back to clearing; the removal still succeeds.
    pub async fn handle_participant_removal(
        &self,
        event_id: EventId,
        participant_id: UserId,
        auto_redraw: bool,
    ) -> Result<RemovalReport, CoreError> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            })?;

        // The redraw is computed up front so the store can apply it inside
        // the removal transaction.
        let mut remaining = Vec::new();
        let (plan, redraw_failure) = if event.draw_completed && auto_redraw {
            remaining = self.store.list_participants(event_id).await?;
            remaining.retain(|p| p.user_id != participant_id);
            let mut rules = self.store.list_rules(event_id).await?;
            rules.retain(|r| !r.references(participant_id));

            match compute_draw(&remaining, &rules, &self.config) {
                Ok(assignment) => (RedrawPlan::Commit(assignment.into_pairs()), None),
                Err(reason) => (RedrawPlan::Clear, Some(reason)),
            }
        } else {
            (RedrawPlan::Clear, None)
        };

        let applied = self
            .store
            .remove_participant(event_id, participant_id, &plan)
            .await?;

        let report = match applied {
            RemovalApplied::NotMember => RemovalReport {
                removed: false,
                redraw: RedrawResult::NotNeeded,
            },
            RemovalApplied::Removed {
                was_drawn: false, ..
            } => RemovalReport {
                removed: true,
                redraw: RedrawResult::NotNeeded,
            },
            RemovalApplied::Removed {
                was_drawn: true,
                redraw_committed,
            } => {
                let redraw = match (&plan, redraw_failure) {
                    (RedrawPlan::Commit(pairs), _) if redraw_committed => {
                        RedrawResult::Redrawn(present(pairs, &remaining))
                    }
                    (RedrawPlan::Commit(_), _) => {
                        tracing::warn!(
                            event_id,
                            participant_id,
                            "Roster changed before redraw was stored, assignments cleared"
                        );
                        RedrawResult::RosterChanged
                    }
                    (_, Some(reason)) if auto_redraw => {
                        tracing::warn!(
                            event_id,
                            participant_id,
                            ?reason,
                            "Redraw after removal failed, assignments cleared"
                        );
                        RedrawResult::FailedAndCleared(reason)
                    }
                    _ => RedrawResult::Cleared,
                };
                RemovalReport {
                    removed: true,
                    redraw,
                }
            }
        };

        if report.removed {
            tracing::info!(event_id, participant_id, auto_redraw, "Participant removed");
        }
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
