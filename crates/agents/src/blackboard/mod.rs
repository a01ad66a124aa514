//! Blackboard - append-only system log
//!
//! Every `log` envelope becomes a [`LogRecord`] stamped with the running
//! statistics and is fanned out to each sink through its own queue.

mod handle;
mod sink_metrics;
pub mod sinks;
mod stats;

pub use handle::SinkHandle;
pub use sink_metrics::{SinkMetrics, SinkMetricsSnapshot};
pub use stats::BlackboardStatsHandle;

use bus::ActorContext;
use chrono::Utc;
use contracts::{ActorName, BlackboardStats, Envelope, EventSink, LogEvent, LogRecord, Payload};
use tracing::{debug, info, instrument};

/// Default per-sink queue depth
pub const DEFAULT_SINK_QUEUE: usize = 256;

pub struct Blackboard {
    ctx: ActorContext,
    sinks: Vec<SinkHandle>,
    stats: BlackboardStatsHandle,
}

impl Blackboard {
    pub fn new(ctx: ActorContext) -> Self {
        Self {
            ctx,
            sinks: Vec::new(),
            stats: BlackboardStatsHandle::default(),
        }
    }

    /// Attach a sink with its own bounded queue
    pub fn with_sink<S: EventSink + Send + 'static>(mut self, sink: S, capacity: usize) -> Self {
        self.sinks.push(SinkHandle::spawn(sink, capacity));
        self
    }

    pub fn stats_handle(&self) -> BlackboardStatsHandle {
        self.stats.clone()
    }

    pub fn sinks(&self) -> &[SinkHandle] {
        &self.sinks
    }

    /// Count the event and hand the record to every sink
    pub fn record(&self, from: ActorName, event: LogEvent) -> LogRecord {
        let stats: BlackboardStats = self.stats.apply(&event);
        let record = LogRecord {
            timestamp: Utc::now(),
            from,
            event,
            stats,
        };
        metrics::counter!("wildguard_blackboard_records_total", "kind" => record.event.kind())
            .increment(1);

        for sink in &self.sinks {
            sink.try_send(record.clone());
        }
        record
    }

    fn handle(&self, envelope: Envelope) {
        let from = envelope.from().clone();
        match envelope.into_payload() {
            Payload::Log(event) => {
                self.record(from, event);
            }
            other => {
                debug!(%from, performative = %other.performative(), "Blackboard ignores non-log envelope");
            }
        }
    }

    #[instrument(name = "blackboard_loop", skip(self))]
    pub async fn run(self) {
        info!(sinks = self.sinks.len(), "Blackboard ready");
        while let Some(envelope) = self.ctx.receive().await {
            self.handle(envelope);
        }

        // Records already delivered still count
        while let Some(envelope) = self.ctx.try_receive() {
            self.handle(envelope);
        }
        for sink in self.sinks {
            sink.shutdown().await;
        }
        info!(stats = ?self.stats.snapshot(), "Blackboard closed");
    }
}
