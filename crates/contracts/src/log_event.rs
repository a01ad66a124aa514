//! Blackboard log events and records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    ActorName, CommitAck, DispatchOrder, EnvelopeId, Incident, IncidentId, Performative,
    PublicMessage, TreatmentDecision, TreatmentRequest, TriageSummary,
};

/// Fire-and-forget event emitted to the blackboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEvent {
    IncidentAdvertised {
        incident: Incident,
    },
    TriageSummary {
        triage: TriageSummary,
    },
    DispatchOrder {
        order: DispatchOrder,
    },
    StationEnRoute {
        station: ActorName,
        incident_id: IncidentId,
        vehicle: String,
        eta_minutes: f64,
    },
    DispatchAcknowledged {
        ack: CommitAck,
    },
    StationResolved {
        station: ActorName,
        incident_id: IncidentId,
    },
    NoResponses {
        incident_id: IncidentId,
    },
    AllUnavailable {
        incident_id: IncidentId,
        responses: usize,
    },
    TreatmentRequested {
        request: TreatmentRequest,
    },
    TreatmentDecision {
        incident_id: IncidentId,
        decision: TreatmentDecision,
    },
    Communication {
        message: PublicMessage,
    },
    Misrouted {
        envelope_id: EnvelopeId,
        performative: Performative,
        from: ActorName,
        passes: u32,
    },
}

impl LogEvent {
    /// Short label used for logging and counters
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IncidentAdvertised { .. } => "incident_advertised",
            Self::TriageSummary { .. } => "triage_summary",
            Self::DispatchOrder { .. } => "dispatch_order",
            Self::StationEnRoute { .. } => "station_en_route",
            Self::DispatchAcknowledged { .. } => "dispatch_acknowledged",
            Self::StationResolved { .. } => "station_resolved",
            Self::NoResponses { .. } => "no_responses",
            Self::AllUnavailable { .. } => "all_unavailable",
            Self::TreatmentRequested { .. } => "treatment_requested",
            Self::TreatmentDecision { .. } => "treatment_decision",
            Self::Communication { .. } => "communication",
            Self::Misrouted { .. } => "misrouted",
        }
    }
}

/// Running blackboard counters, owned by the blackboard actor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackboardStats {
    pub incidents: u64,
    pub triage: u64,
    pub dispatches: u64,
    pub acknowledgements: u64,
    pub escalations: u64,
    pub treatments: u64,
    pub communications: u64,
    pub misrouted: u64,
}

/// One persisted blackboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub from: ActorName,
    pub event: LogEvent,
    pub stats: BlackboardStats,
}
