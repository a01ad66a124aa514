//! Dispatch protocol records exchanged between coordinator and responders

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ActorName, GeoPoint, Incident, IncidentId, Severity, TriageSummary};

/// Answer to a `query-availability`, computed by the responder itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityAnswer {
    pub station_name: ActorName,
    pub distance_km: f64,
    pub terrain: String,
    pub eta_minutes: f64,
    pub vehicle: String,
    pub available: bool,
    pub capable: bool,
    pub confidence: f64,
    pub staff_available: u32,
    pub equipment: Vec<String>,
    pub reasoning: String,
}

impl AvailabilityAnswer {
    /// Eligible for dispatch: free and holding the required equipment
    pub fn is_eligible(&self) -> bool {
        self.available && self.capable
    }
}

/// Binding order sent to exactly one responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchOrder {
    pub incident_id: IncidentId,
    pub station_name: ActorName,
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub vehicle: String,
    pub terrain: String,
    pub reasoning: String,
    /// Every answer received in the round, kept for auditability
    pub all_options: Vec<AvailabilityAnswer>,
}

impl DispatchOrder {
    pub fn from_selection(
        incident_id: IncidentId,
        selected: &AvailabilityAnswer,
        all_options: Vec<AvailabilityAnswer>,
    ) -> Self {
        Self {
            incident_id,
            station_name: selected.station_name.clone(),
            distance_km: selected.distance_km,
            eta_minutes: selected.eta_minutes,
            vehicle: selected.vehicle.clone(),
            terrain: selected.terrain.clone(),
            reasoning: selected.reasoning.clone(),
            all_options,
        }
    }
}

/// Responder confirmation after accepting a commit-order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitAck {
    pub station_name: ActorName,
    pub incident_id: IncidentId,
    pub message: String,
}

/// Why a round ended without a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// Nobody answered inside the collection window
    NoResponse,
    /// Answers arrived but none were available and capable
    AllUnavailable,
}

impl EscalationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::AllUnavailable => "all_unavailable",
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal notice of a round where no dispatch could be made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationNotice {
    pub incident_id: IncidentId,
    pub reason: EscalationReason,
    pub message: String,
    #[serde(default)]
    pub answers: Vec<AvailabilityAnswer>,
}

/// Transparency notice for downstream consumers after a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchNotice {
    pub incident: Incident,
    pub order: DispatchOrder,
}

/// Secondary workflow trigger sent to the vet after a dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRequest {
    pub incident_id: IncidentId,
    pub station_name: ActorName,
    pub location: GeoPoint,
    pub species: String,
    pub injury_severity: Severity,
    pub triage: Option<TriageSummary>,
    pub eta_minutes: f64,
}
