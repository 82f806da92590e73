//! Constrained random assignment solver.
//!
//! Finds a bijection giver -> receiver over the roster with no fixed points
//! and no excluded pairs, or reports that none exists. The search is a
//! complete backtracking search over givers in input order: if a valid
//! assignment exists it is found, at a worst-case cost of O(n!).
//!
//! All search state (the partial assignment and the used-receiver marks) is
//! local to one call and restored on backtrack.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::exclusion::ExclusionIndex;
use crate::types::UserId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A bijection without self-assignment needs at least this many participants.
pub const MIN_PARTICIPANTS: usize = 2;

/// Default cap on tentative placements before the search gives up.
pub const DEFAULT_MAX_SEARCH_STEPS: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One giver -> receiver entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AssignmentPair {
    pub giver_id: UserId,
    pub receiver_id: UserId,
}

/// A complete assignment produced by the solver, one pair per giver in the
/// order the givers were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pairs: Vec<AssignmentPair>,
}

impl Assignment {
    pub fn pairs(&self) -> &[AssignmentPair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<AssignmentPair> {
        self.pairs
    }

    pub fn receiver_of(&self, giver_id: UserId) -> Option<UserId> {
        self.pairs
            .iter()
            .find(|p| p.giver_id == giver_id)
            .map(|p| p.receiver_id)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Why no assignment could be produced. This is an expected outcome that the
/// organizer can fix, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Infeasible {
    #[error("At least 2 participants are needed to draw assignments.")]
    TooFewParticipants,

    #[error(
        "Could not find a valid assignment that satisfies all constraints. \
         Try removing some exclusion rules."
    )]
    OverConstrained,

    #[error(
        "The draw gave up before finding a valid assignment. \
         Try removing some exclusion rules."
    )]
    SearchBudgetExhausted,
}

/// Knobs for a single solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveOptions {
    /// Shuffle the receiver candidate order once per call so repeated draws
    /// over the same roster produce different pairings.
    pub shuffle: bool,
    /// Upper bound on tentative placements. `None` searches without limit.
    pub max_steps: Option<u64>,
}

impl Default for SolveOptions {
    /// Deterministic, unbounded search in input order.
    fn default() -> Self {
        Self {
            shuffle: false,
            max_steps: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Solve deterministically: candidates are tried in roster order.
///
/// `participant_ids` must not contain duplicates.
pub fn solve(
    participant_ids: &[UserId],
    exclusions: &ExclusionIndex,
) -> Result<Assignment, Infeasible> {
    solve_with_options(participant_ids, exclusions, &SolveOptions::default())
}

/// Solve with explicit [`SolveOptions`].
pub fn solve_with_options(
    participant_ids: &[UserId],
    exclusions: &ExclusionIndex,
    options: &SolveOptions,
) -> Result<Assignment, Infeasible> {
    debug_assert!(
        {
            let mut sorted = participant_ids.to_vec();
            sorted.sort_unstable();
            sorted.windows(2).all(|w| w[0] != w[1])
        },
        "participant ids must be unique"
    );

    if participant_ids.len() < MIN_PARTICIPANTS {
        return Err(Infeasible::TooFewParticipants);
    }

    let mut candidates = participant_ids.to_vec();
    if options.shuffle {
        candidates.shuffle(&mut rand::rng());
    }

    let mut search = Search {
        givers: participant_ids,
        candidates: &candidates,
        exclusions,
        used: vec![false; candidates.len()],
        chosen: Vec::with_capacity(participant_ids.len()),
        steps: 0,
        max_steps: options.max_steps,
    };

    match search.place(0) {
        Step::Found => {
            let pairs = participant_ids
                .iter()
                .zip(&search.chosen)
                .map(|(&giver_id, &slot)| AssignmentPair {
                    giver_id,
                    receiver_id: candidates[slot],
                })
                .collect();
            Ok(Assignment { pairs })
        }
        Step::Exhausted => Err(Infeasible::OverConstrained),
        Step::OutOfBudget => Err(Infeasible::SearchBudgetExhausted),
    }
}

enum Step {
    Found,
    Exhausted,
    OutOfBudget,
}

struct Search<'a> {
    givers: &'a [UserId],
    candidates: &'a [UserId],
    exclusions: &'a ExclusionIndex,
    /// `used[i]` is set while `candidates[i]` is somebody's receiver.
    used: Vec<bool>,
    /// Candidate slot chosen for each placed giver, in giver order.
    chosen: Vec<usize>,
    steps: u64,
    max_steps: Option<u64>,
}

impl Search<'_> {
    fn place(&mut self, index: usize) -> Step {
        if index == self.givers.len() {
            return Step::Found;
        }

        let giver_id = self.givers[index];
        let forbidden = self.exclusions.forbidden_for(giver_id);

        for slot in 0..self.candidates.len() {
            let receiver_id = self.candidates[slot];
            if self.used[slot]
                || receiver_id == giver_id
                || forbidden.is_some_and(|set| set.contains(&receiver_id))
            {
                continue;
            }

            self.steps += 1;
            if self.max_steps.is_some_and(|max| self.steps > max) {
                return Step::OutOfBudget;
            }

            self.used[slot] = true;
            self.chosen.push(slot);

            match self.place(index + 1) {
                Step::Exhausted => {}
                done => return done,
            }

            // Backtrack.
            self.chosen.pop();
            self.used[slot] = false;
        }

        Step::Exhausted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
