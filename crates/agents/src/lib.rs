//! # Agents
//!
//! Collaborator actors around the dispatch core, and the launcher that
//! wires a whole sanctuary onto one registry.
//!
//! - [`FieldReporter`]: raw report -> incident, advertised to coordinator and triage
//! - [`Triage`]: incident -> priority and resources
//! - [`Vet`]: treatment requests, clinic capacity, station release
//! - [`Communication`]: public advisories for dispatches and escalations
//! - [`Blackboard`]: append-only log with running statistics and sinks

pub mod blackboard;
mod communication;
mod field_reporter;
mod sanctuary;
mod triage;
mod vet;

#[cfg(test)]
mod test_support;

pub use blackboard::{Blackboard, BlackboardStatsHandle};
pub use communication::Communication;
pub use field_reporter::FieldReporter;
pub use sanctuary::{Sanctuary, SanctuaryOptions, INTAKE};
pub use triage::Triage;
pub use vet::Vet;
