//! Blackboard statistics, owned by the blackboard actor

use std::sync::Arc;

use contracts::{BlackboardStats, LogEvent};
use parking_lot::Mutex;

/// Read-only view of the blackboard's running totals
#[derive(Debug, Clone, Default)]
pub struct BlackboardStatsHandle {
    inner: Arc<Mutex<BlackboardStats>>,
}

impl BlackboardStatsHandle {
    pub fn snapshot(&self) -> BlackboardStats {
        *self.inner.lock()
    }

    /// Count `event` and return the totals including it
    pub(crate) fn apply(&self, event: &LogEvent) -> BlackboardStats {
        let mut stats = self.inner.lock();
        match event {
            LogEvent::IncidentAdvertised { .. } => stats.incidents += 1,
            LogEvent::TriageSummary { .. } => stats.triage += 1,
            LogEvent::DispatchOrder { .. } => stats.dispatches += 1,
            LogEvent::DispatchAcknowledged { .. } => stats.acknowledgements += 1,
            LogEvent::NoResponses { .. } | LogEvent::AllUnavailable { .. } => {
                stats.escalations += 1
            }
            LogEvent::TreatmentDecision { .. } => stats.treatments += 1,
            LogEvent::Communication { .. } => stats.communications += 1,
            LogEvent::Misrouted { .. } => stats.misrouted += 1,
            LogEvent::StationEnRoute { .. }
            | LogEvent::StationResolved { .. }
            | LogEvent::TreatmentRequested { .. } => {}
        }
        *stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalations_count_both_reasons() {
        let handle = BlackboardStatsHandle::default();
        handle.apply(&LogEvent::NoResponses {
            incident_id: "INC-1".into(),
        });
        let stats = handle.apply(&LogEvent::AllUnavailable {
            incident_id: "INC-2".into(),
            responses: 3,
        });

        assert_eq!(stats.escalations, 2);
        assert_eq!(handle.snapshot(), stats);
    }

    #[test]
    fn test_progress_events_are_not_counted() {
        let handle = BlackboardStatsHandle::default();
        handle.apply(&LogEvent::StationResolved {
            station: "Alpha".into(),
            incident_id: "INC-1".into(),
        });
        assert_eq!(handle.snapshot(), BlackboardStats::default());
    }
}
