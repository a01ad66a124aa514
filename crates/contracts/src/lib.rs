//! # Contracts
//!
//! Frozen interface contracts shared by every WildGuard crate: the envelope
//! wire format, incident and dispatch records, oracle role outputs and the
//! static park blueprint.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Envelopes are stamped with wall-clock UTC (`chrono::DateTime<Utc>`)
//! - Collection windows and timeouts use the monotonic tokio clock

mod actor_name;
mod blueprint;
mod decision;
mod dispatch;
mod envelope;
mod error;
mod incident;
mod log_event;
mod oracle;
mod sink;

pub mod names;

pub use actor_name::{ActorName, Recipient, BROADCAST};
pub use blueprint::*;
pub use decision::*;
pub use dispatch::*;
pub use envelope::*;
pub use error::*;
pub use incident::*;
pub use log_event::*;
pub use oracle::{OracleRole, ReasoningOracle};
pub use sink::EventSink;
