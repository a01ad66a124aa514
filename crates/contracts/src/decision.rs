//! Oracle role outputs and their contracts
//!
//! Each role's contract is its typed output: the value must deserialize into
//! the type and pass `validator` rules. Every role also has a documented
//! built-in fallback used when the oracle fails and no configured fallback
//! exists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ContractError, GeoPoint, IncidentDraft, IncidentId, OracleRole, Severity};

/// Typed output of one oracle role
pub trait RoleContract: DeserializeOwned + Serialize + Validate + Clone + Send + 'static {
    /// Role whose output this type is
    const ROLE: OracleRole;

    /// Deterministic fallback used when nothing better is configured
    fn builtin_fallback() -> Self;

    /// Parse and validate a raw oracle value against this contract
    fn from_value(value: serde_json::Value) -> Result<Self, ContractError> {
        let parsed: Self = serde_json::from_value(value)
            .map_err(|e| ContractError::contract_violation(Self::ROLE, e.to_string()))?;
        parsed
            .validate()
            .map_err(|e| ContractError::contract_violation(Self::ROLE, e.to_string()))?;
        Ok(parsed)
    }
}

/// Triage assessment for one incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TriageSummary {
    pub incident_id: IncidentId,
    #[validate(range(min = 1, max = 5))]
    pub priority: u8,
    #[serde(default)]
    pub required_resources: Vec<String>,
    #[serde(default = "open")]
    pub access_difficulty: String,
    #[validate(length(min = 1))]
    pub recommended_actions: Vec<String>,
}

fn open() -> String {
    "open".to_string()
}

impl RoleContract for TriageSummary {
    const ROLE: OracleRole = OracleRole::Triage;

    fn builtin_fallback() -> Self {
        Self {
            incident_id: IncidentId::new("unknown"),
            priority: 3,
            required_resources: vec!["ranger_unit".to_string()],
            access_difficulty: open(),
            recommended_actions: vec![
                "Stabilize animal".to_string(),
                "Monitor from safe distance".to_string(),
            ],
        }
    }
}

/// Vet verdict on a treatment request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Decline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TreatmentDecision {
    pub decision: Verdict,
    #[serde(default)]
    pub reason: String,
    /// Minutes
    #[validate(range(max = 1440))]
    #[serde(default = "default_treatment_time")]
    pub expected_treatment_time: u32,
}

fn default_treatment_time() -> u32 {
    30
}

impl TreatmentDecision {
    pub fn is_accepted(&self) -> bool {
        self.decision == Verdict::Accept
    }
}

impl RoleContract for TreatmentDecision {
    const ROLE: OracleRole = OracleRole::Vet;

    fn builtin_fallback() -> Self {
        Self {
            decision: Verdict::Accept,
            reason: "fallback".to_string(),
            expected_treatment_time: default_treatment_time(),
        }
    }
}

/// Public-facing message text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PublicMessage {
    #[validate(length(min = 1))]
    pub message_text: String,
    #[validate(length(min = 1))]
    pub channels: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

impl RoleContract for PublicMessage {
    const ROLE: OracleRole = OracleRole::Communication;

    fn builtin_fallback() -> Self {
        Self {
            message_text:
                "Emergency alert: Please stay safe and follow official evacuation instructions."
                    .to_string(),
            channels: vec!["sms".to_string(), "radio".to_string()],
            explanation: "Fallback message due to schema validation error.".to_string(),
        }
    }
}

impl RoleContract for IncidentDraft {
    const ROLE: OracleRole = OracleRole::FieldReporter;

    fn builtin_fallback() -> Self {
        Self {
            id: None,
            species: "unknown".to_string(),
            gps: GeoPoint::new(0.0, 0.0),
            observed_behavior: "unknown".to_string(),
            injury_severity: Severity::Low,
            reporter_reliability: 0.5,
            access_difficulty: open(),
            priority: 2,
        }
    }
}

/// Check a raw value against the contract of `role`
pub fn validate_role_output(role: OracleRole, value: &serde_json::Value) -> Result<(), ContractError> {
    match role {
        OracleRole::FieldReporter => IncidentDraft::from_value(value.clone()).map(drop),
        OracleRole::Triage => TriageSummary::from_value(value.clone()).map(drop),
        OracleRole::Vet => TreatmentDecision::from_value(value.clone()).map(drop),
        OracleRole::Communication => PublicMessage::from_value(value.clone()).map(drop),
    }
}
