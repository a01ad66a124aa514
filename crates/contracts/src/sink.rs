//! EventSink trait - Blackboard output interface
//!
//! Defines the abstract interface for blackboard sinks.

use crate::{ContractError, LogRecord};

/// Log record output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(EventSink: Send)]
pub trait LocalEventSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append one record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &LogRecord) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
