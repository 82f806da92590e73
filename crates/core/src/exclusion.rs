//! Exclusion rules and the per-giver lookup index built from them.
//!
//! A rule `(giver, forbidden_receiver)` forbids the solver from assigning that
//! receiver to that giver. Rules are directed: excluding A from B says nothing
//! about B giving to A.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::UserId;

/// A directed exclusion rule scoped to one event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExclusionRule {
    pub giver_id: UserId,
    pub forbidden_receiver_id: UserId,
}

impl ExclusionRule {
    pub fn new(giver_id: UserId, forbidden_receiver_id: UserId) -> Self {
        Self {
            giver_id,
            forbidden_receiver_id,
        }
    }

    /// Returns `true` if the rule mentions `user_id` in either role.
    pub fn references(&self, user_id: UserId) -> bool {
        self.giver_id == user_id || self.forbidden_receiver_id == user_id
    }
}

/// Outcome of adding a rule. Adding an existing rule leaves it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Added,
    AlreadyExists,
}

/// Lookup from giver to the receivers that giver may not draw.
///
/// Givers without any rule are absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionIndex {
    forbidden: HashMap<UserId, HashSet<UserId>>,
}

impl ExclusionIndex {
    /// Build the index from an event's rules. Duplicate rules collapse.
    pub fn build<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a ExclusionRule>,
    {
        let mut forbidden: HashMap<UserId, HashSet<UserId>> = HashMap::new();
        for rule in rules {
            forbidden
                .entry(rule.giver_id)
                .or_default()
                .insert(rule.forbidden_receiver_id);
        }
        Self { forbidden }
    }

    /// The receivers `giver_id` may not be assigned, if any.
    pub fn forbidden_for(&self, giver_id: UserId) -> Option<&HashSet<UserId>> {
        self.forbidden.get(&giver_id)
    }

    pub fn is_excluded(&self, giver_id: UserId, receiver_id: UserId) -> bool {
        self.forbidden
            .get(&giver_id)
            .is_some_and(|set| set.contains(&receiver_id))
    }

    pub fn as_map(&self) -> &HashMap<UserId, HashSet<UserId>> {
        &self.forbidden
    }

    /// Number of distinct (giver, receiver) pairs.
    pub fn len(&self) -> usize {
        self.forbidden.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }
}

/// Validate a rule the organizer wants to add.
///
/// Both ids must belong to the roster, and a rule excluding a participant
/// from themself is rejected since self-assignment is never allowed anyway.
pub fn validate_rule(
    rule: &ExclusionRule,
    roster: &HashSet<UserId>,
) -> Result<(), CoreError> {
    if rule.giver_id == rule.forbidden_receiver_id {
        return Err(CoreError::Validation(
            "Giver and forbidden receiver must be different participants".to_string(),
        ));
    }
    if !roster.contains(&rule.giver_id) || !roster.contains(&rule.forbidden_receiver_id) {
        return Err(CoreError::Validation(
            "Both users must be participants of the event".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rules_give_empty_index() {
        let index = ExclusionIndex::build(&Vec::<ExclusionRule>::new());
        assert!(index.is_empty());
        assert!(index.forbidden_for(1).is_none());
        assert!(!index.is_excluded(1, 2));
    }

    #[test]
    fn rules_grouped_by_giver() {
        let rules = [
            ExclusionRule::new(1, 2),
            ExclusionRule::new(1, 3),
            ExclusionRule::new(2, 1),
        ];
        let index = ExclusionIndex::build(&rules);

        assert_eq!(index.forbidden_for(1).map(HashSet::len), Some(2));
        assert!(index.is_excluded(1, 2));
        assert!(index.is_excluded(1, 3));
        assert!(index.is_excluded(2, 1));
        assert!(!index.is_excluded(2, 3));
        assert!(index.forbidden_for(3).is_none());
    }

    #[test]
    fn rules_are_directed() {
        let index = ExclusionIndex::build(&[ExclusionRule::new(1, 2)]);
        assert!(index.is_excluded(1, 2));
        assert!(!index.is_excluded(2, 1));
    }

    #[test]
    fn duplicate_rules_collapse() {
        let rules = [ExclusionRule::new(4, 5), ExclusionRule::new(4, 5)];
        let index = ExclusionIndex::build(&rules);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn references_matches_both_roles() {
        let rule = ExclusionRule::new(7, 8);
        assert!(rule.references(7));
        assert!(rule.references(8));
        assert!(!rule.references(9));
    }

    #[test]
    fn validate_rule_rejects_self_exclusion() {
        let roster: HashSet<UserId> = [1, 2].into_iter().collect();
        let err = validate_rule(&ExclusionRule::new(1, 1), &roster).unwrap_err();
        assert!(err.to_string().contains("different"));
    }

    #[test]
    fn validate_rule_rejects_non_participants() {
        let roster: HashSet<UserId> = [1, 2].into_iter().collect();
        assert!(validate_rule(&ExclusionRule::new(1, 3), &roster).is_err());
        assert!(validate_rule(&ExclusionRule::new(3, 1), &roster).is_err());
        assert!(validate_rule(&ExclusionRule::new(1, 2), &roster).is_ok());
    }
}
