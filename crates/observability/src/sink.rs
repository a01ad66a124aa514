//! AggregatorSink - a blackboard sink feeding [`DispatchAggregator`]

use std::sync::Arc;

use contracts::{ContractError, EventSink, LogEvent, LogRecord};
use parking_lot::Mutex;

use crate::metrics::{record_blackboard_stats, record_dispatch, DispatchAggregator, DispatchSummary};

/// Aggregator shared between the sink worker and the reader
#[derive(Debug, Clone, Default)]
pub struct SharedAggregator(Arc<Mutex<DispatchAggregator>>);

impl SharedAggregator {
    pub fn summary(&self) -> DispatchSummary {
        self.0.lock().summary()
    }
}

pub struct AggregatorSink {
    aggregator: SharedAggregator,
}

impl AggregatorSink {
    pub fn new(aggregator: SharedAggregator) -> Self {
        Self { aggregator }
    }
}

impl EventSink for AggregatorSink {
    fn name(&self) -> &str {
        "aggregator"
    }

    async fn write(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        if let LogEvent::DispatchOrder { order } = &record.event {
            record_dispatch(order);
        }
        record_blackboard_stats(&record.stats);
        self.aggregator.0.lock().update(record);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::BlackboardStats;

    #[tokio::test]
    async fn test_sink_updates_shared_aggregator() {
        let shared = SharedAggregator::default();
        let mut sink = AggregatorSink::new(shared.clone());

        sink.write(&LogRecord {
            timestamp: Utc::now(),
            from: "CoordinatorAgent".into(),
            event: LogEvent::AllUnavailable {
                incident_id: "INC-1".into(),
                responses: 5,
            },
            stats: BlackboardStats::default(),
        })
        .await
        .unwrap();

        assert_eq!(shared.summary().all_unavailable, 1);
    }
}
