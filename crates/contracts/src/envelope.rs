//! Envelope - the unit of communication between actors
//!
//! An envelope is immutable once built. Its performative is derived from the
//! payload so the wire tag and payload shape cannot disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{
    ActorName, AvailabilityAnswer, CommitAck, DispatchNotice, DispatchOrder, EscalationNotice,
    Incident, IncidentId, LogEvent, RawReport, Recipient, TreatmentDecision, TreatmentRequest,
    TriageSummary,
};

/// Globally unique envelope identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeId(Uuid);

impl EnvelopeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed wire-level vocabulary of message intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performative {
    QueryAvailability,
    AvailabilityAnswer,
    CommitOrder,
    CommitAck,
    Resolve,
    Escalate,
    Event,
    Inform,
    Log,
}

impl Performative {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryAvailability => "query-availability",
            Self::AvailabilityAnswer => "availability-answer",
            Self::CommitOrder => "commit-order",
            Self::CommitAck => "commit-ack",
            Self::Resolve => "resolve",
            Self::Escalate => "escalate",
            Self::Event => "event",
            Self::Inform => "inform",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational payloads carried under the `inform` performative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inform {
    /// Unstructured report for the field reporter
    Report(RawReport),
    /// Normalized incident for triage
    Incident(Incident),
    /// Triage assessment for the coordinator
    Triage(TriageSummary),
    /// Dispatch outcome for downstream consumers
    Dispatch(DispatchNotice),
    TreatmentRequest(TreatmentRequest),
    Treatment {
        incident_id: IncidentId,
        decision: TreatmentDecision,
    },
}

/// Performative-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "performative", content = "content", rename_all = "kebab-case")]
pub enum Payload {
    QueryAvailability {
        incident: Incident,
    },
    AvailabilityAnswer {
        incident_id: IncidentId,
        answer: AvailabilityAnswer,
    },
    CommitOrder(DispatchOrder),
    CommitAck(CommitAck),
    Resolve {
        incident_id: IncidentId,
    },
    Escalate(EscalationNotice),
    Event {
        incident: Incident,
    },
    Inform(Inform),
    Log(LogEvent),
}

impl Payload {
    pub fn performative(&self) -> Performative {
        match self {
            Self::QueryAvailability { .. } => Performative::QueryAvailability,
            Self::AvailabilityAnswer { .. } => Performative::AvailabilityAnswer,
            Self::CommitOrder(_) => Performative::CommitOrder,
            Self::CommitAck(_) => Performative::CommitAck,
            Self::Resolve { .. } => Performative::Resolve,
            Self::Escalate(_) => Performative::Escalate,
            Self::Event { .. } => Performative::Event,
            Self::Inform(_) => Performative::Inform,
            Self::Log(_) => Performative::Log,
        }
    }
}

/// Addressed, timestamped message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    id: EnvelopeId,
    from: ActorName,
    to: Recipient,
    timestamp: DateTime<Utc>,
    payload: Payload,
}

impl Envelope {
    /// Build an envelope stamped with a fresh id and the current time
    pub fn new(from: ActorName, to: Recipient, payload: Payload) -> Self {
        Self {
            id: EnvelopeId::generate(),
            from,
            to,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn id(&self) -> EnvelopeId {
        self.id
    }

    pub fn from(&self) -> &ActorName {
        &self.from
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn performative(&self) -> Performative {
        self.payload.performative()
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}
