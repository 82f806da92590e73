//! Validation of organizer-supplied assignment lists.
//!
//! A manual edit replaces the whole stored assignment, so the proposal must
//! be a complete bijection over the current roster. Exclusion rules are not
//! consulted here: the organizer may deliberately override them by hand.

use std::collections::{HashMap, HashSet};

use crate::event::Participant;
use crate::solver::AssignmentPair;
use crate::types::UserId;

/// Why a proposed manual assignment was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditRejection {
    /// The proposal names a user that is not on the roster. The message does
    /// not say which id, so a tampered payload learns nothing about who is
    /// or is not a participant.
    #[error("Assignment includes non-participant users")]
    NonParticipant,

    #[error("Self-assignment is not allowed")]
    SelfAssignment,

    #[error("User {name} appears multiple times as a giver")]
    DuplicateGiver { user_id: UserId, name: String },

    #[error("User {name} appears multiple times as a receiver")]
    DuplicateReceiver { user_id: UserId, name: String },

    #[error("Assignment must include all participants exactly once")]
    Incomplete,
}

impl EditRejection {
    /// `true` for rejections that indicate a forged or corrupted request
    /// rather than an organizer mistake.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::NonParticipant)
    }
}

/// Validate `proposal` against the event's current roster.
///
/// Checks run per entry in order (membership, self-assignment, repeated
/// giver, repeated receiver) and the first failure wins; completeness is
/// checked last.
pub fn validate(
    proposal: &[AssignmentPair],
    roster: &[Participant],
) -> Result<(), EditRejection> {
    let names: HashMap<UserId, &str> = roster
        .iter()
        .map(|p| (p.user_id, p.display_name.as_str()))
        .collect();
    let name_of = |id: UserId| names.get(&id).copied().unwrap_or_default().to_string();

    let mut givers: HashSet<UserId> = HashSet::with_capacity(proposal.len());
    let mut receivers: HashSet<UserId> = HashSet::with_capacity(proposal.len());

    for pair in proposal {
        if !names.contains_key(&pair.giver_id) || !names.contains_key(&pair.receiver_id) {
            return Err(EditRejection::NonParticipant);
        }
        if pair.giver_id == pair.receiver_id {
            return Err(EditRejection::SelfAssignment);
        }
        if !givers.insert(pair.giver_id) {
            return Err(EditRejection::DuplicateGiver {
                user_id: pair.giver_id,
                name: name_of(pair.giver_id),
            });
        }
        if !receivers.insert(pair.receiver_id) {
            return Err(EditRejection::DuplicateReceiver {
                user_id: pair.receiver_id,
                name: name_of(pair.receiver_id),
            });
        }
    }

    if givers.len() != names.len() || receivers.len() != names.len() {
        return Err(EditRejection::Incomplete);
    }

    Ok(())
}
