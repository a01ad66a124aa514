//! ReasoningOracle trait - external structured-decision service
//!
//! The oracle is a black box: given a role, a fixed prompt and a context
//! object it returns some JSON value. Callers never trust the shape; see
//! [`crate::RoleContract`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ContractError;

/// Agent role the oracle is asked to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleRole {
    FieldReporter,
    Triage,
    Vet,
    Communication,
}

impl OracleRole {
    pub const ALL: [OracleRole; 4] = [
        Self::FieldReporter,
        Self::Triage,
        Self::Vet,
        Self::Communication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldReporter => "field_reporter",
            Self::Triage => "triage",
            Self::Vet => "vet",
            Self::Communication => "communication",
        }
    }

    /// Agent label expected by the remote gateway
    pub fn agent_label(&self) -> &'static str {
        match self {
            Self::FieldReporter => "FieldReporter",
            Self::Triage => "TriageAgent",
            Self::Vet => "VetAgent",
            Self::Communication => "CommunicationWriter",
        }
    }
}

impl fmt::Display for OracleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasoning oracle interface
///
/// Implementations may fail or hang; the gateway bounds every call with a
/// timeout and substitutes a fallback.
#[trait_variant::make(ReasoningOracle: Send)]
pub trait LocalReasoningOracle {
    /// Ask the oracle to play `role` with `prompt` over `context`
    async fn run(
        &self,
        role: OracleRole,
        prompt: &str,
        context: &serde_json::Value,
    ) -> Result<serde_json::Value, ContractError>;
}
