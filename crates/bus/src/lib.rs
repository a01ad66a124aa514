//! # Bus
//!
//! In-memory actor substrate.
//!
//! Responsibilities:
//! - Per-actor FIFO mailboxes with cooperative (non-polling) receive
//! - Name -> mailbox registry with point-to-point and broadcast delivery
//! - Actor context: send, receive, try_receive and deadline-bounded receive
//! - Shutdown signal observed at every suspension point
//!
//! # Architecture
//!
//! ```text
//!   ActorContext::send ──► Registry::publish ──┬──► Mailbox (name A)
//!                                              ├──► Mailbox (name B)
//!                                              └──► ... (broadcast: all)
//!
//!   ActorContext::receive ◄── own Mailbox (Notify wakeup)
//! ```

mod context;
mod mailbox;
mod metrics;
mod registry;

pub use context::{ActorContext, Outbox, Received};
pub use mailbox::Mailbox;
pub use metrics::{BusMetrics, BusMetricsSnapshot};
pub use registry::Registry;

pub use tokio_util::sync::CancellationToken;
