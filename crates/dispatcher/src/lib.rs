//! # Dispatcher
//!
//! Proximity dispatch protocol.
//!
//! Responsibilities:
//! - Geo model: haversine distance, terrain-adjusted ETA, terrain zones
//! - Capability model: required equipment and vehicle precedence
//! - Responder unit actor: answers availability queries, tracks busy state
//! - Dispatch coordinator actor: fan-out, timed collection, selection,
//!   commit or escalation
//!
//! # Architecture
//!
//! ```text
//!   event ──► Coordinator ──query-availability──► ResponderUnit × N
//!                 ▲                                    │
//!                 └────────availability-answer─────────┘
//!                 │
//!                 ├──commit-order──► winner ──commit-ack──► Coordinator
//!                 ├──inform(dispatch) / escalate──► Communication
//!                 └──log──► Blackboard
//! ```

pub mod capability;
pub mod coordinator;
pub mod geo;
pub mod responder;
mod round;
mod select;

#[cfg(test)]
mod test_support;

pub use capability::{assess, Capability};
pub use coordinator::Coordinator;
pub use responder::{ResponderState, ResponderUnit};
pub use round::{Phase, RoundOutcome};
pub use select::select_responder;
