//! Row structs for the event tables.
//!
//! Each submodule holds a `FromRow` struct matching its table plus the
//! conversion into the corresponding `santa_core` domain type.

pub mod assignment;
pub mod event;
pub mod exclusion_rule;
pub mod participant;
