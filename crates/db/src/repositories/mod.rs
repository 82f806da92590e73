//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads accept `&PgPool`; writes that must share a transaction accept
//! `&mut sqlx::Transaction<'_, sqlx::Postgres>`.

pub mod assignment_repo;
pub mod event_repo;
pub mod exclusion_rule_repo;
pub mod participant_repo;

pub use assignment_repo::AssignmentRepo;
pub use event_repo::EventRepo;
pub use exclusion_rule_repo::ExclusionRuleRepo;
pub use participant_repo::ParticipantRepo;
