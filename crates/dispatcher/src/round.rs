//! Incident round state

use contracts::{ActorName, AvailabilityAnswer, Envelope, EscalationReason, Incident};
use tokio::time::Instant;

/// Coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Deciding,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Collecting => "collecting",
            Self::Deciding => "deciding",
        }
    }
}

/// How a round ended
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Dispatched {
        station: ActorName,
        distance_km: f64,
        eta_minutes: f64,
    },
    Escalated(EscalationReason),
    /// Shutdown arrived while collecting; no decision was emitted
    Interrupted,
}

impl RoundOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dispatched { .. } => "dispatched",
            Self::Escalated(reason) => reason.as_str(),
            Self::Interrupted => "interrupted",
        }
    }
}

/// Ephemeral state of one open round
#[derive(Debug)]
pub(crate) struct IncidentRound {
    pub incident: Incident,
    pub answers: Vec<AvailabilityAnswer>,
    pub deadline: Instant,
    pub started: Instant,
    /// Envelopes set aside until the round closes, in arrival order,
    /// with the number of earlier rounds that already set them aside
    pub deferred: Vec<(Envelope, u32)>,
}

impl IncidentRound {
    pub fn open(incident: Incident, window: std::time::Duration) -> Self {
        let started = Instant::now();
        Self {
            incident,
            answers: Vec::new(),
            deadline: started + window,
            started,
            deferred: Vec::new(),
        }
    }
}
