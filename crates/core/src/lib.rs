//! Domain logic for Secret Santa gift exchanges.
//!
//! Everything here is free of database and HTTP concerns: the exclusion
//! index, the assignment solver, the manual edit validator, and the
//! synchronizer that applies draws and edits through an [`store::EventStore`].

pub mod access;
pub mod draw;
pub mod error;
pub mod event;
pub mod exclusion;
pub mod manual_edit;
pub mod solver;
pub mod store;
pub mod types;
