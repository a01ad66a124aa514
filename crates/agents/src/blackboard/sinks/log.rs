//! LogSink - blackboard records as tracing events

use contracts::{ContractError, EventSink, LogRecord};
use tracing::{info, instrument};

pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, kind = record.event.kind())
    )]
    async fn write(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        let stats = &record.stats;
        info!(
            from = %record.from,
            kind = record.event.kind(),
            incidents = stats.incidents,
            dispatches = stats.dispatches,
            escalations = stats.escalations,
            treatments = stats.treatments,
            "Blackboard record"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
