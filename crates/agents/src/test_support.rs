//! Fixtures shared by the actor tests

use std::time::Duration;

use bus::{ActorContext, CancellationToken, Registry};
use contracts::{
    names, ContractError, GeoPoint, Incident, OracleRole, ReasoningOracle, Severity,
};
use oracle::{OracleGateway, RoleTable, StubOracle};
use std::sync::Arc;

/// Registry with stand-in mailboxes under the well-known names
pub(crate) struct Bench {
    pub registry: Arc<Registry>,
    pub token: CancellationToken,
    pub coordinator: ActorContext,
    pub triage: ActorContext,
    pub blackboard: ActorContext,
}

impl Bench {
    pub fn new() -> Self {
        let registry = Registry::new();
        let token = CancellationToken::new();
        Self {
            coordinator: registry.join(names::COORDINATOR, token.clone()),
            triage: registry.join(names::TRIAGE, token.clone()),
            blackboard: registry.join(names::BLACKBOARD, token.clone()),
            registry,
            token,
        }
    }

    pub fn join(&self, name: &str) -> ActorContext {
        self.registry.join(name, self.token.clone())
    }
}

/// Oracle that always errors
pub(crate) struct FailingOracle;

impl ReasoningOracle for FailingOracle {
    async fn run(
        &self,
        role: OracleRole,
        _prompt: &str,
        _context: &serde_json::Value,
    ) -> Result<serde_json::Value, ContractError> {
        Err(ContractError::oracle_call(role, "unreachable"))
    }
}

/// Oracle whose calls never complete
pub(crate) struct HangingOracle;

impl ReasoningOracle for HangingOracle {
    async fn run(
        &self,
        _role: OracleRole,
        _prompt: &str,
        _context: &serde_json::Value,
    ) -> Result<serde_json::Value, ContractError> {
        std::future::pending().await
    }
}

pub(crate) fn stub_gateway() -> OracleGateway<StubOracle> {
    OracleGateway::new(StubOracle::new(), RoleTable::new(), Duration::from_secs(5))
}

pub(crate) fn failing_gateway() -> OracleGateway<FailingOracle> {
    OracleGateway::new(FailingOracle, RoleTable::new(), Duration::from_secs(5))
}

pub(crate) fn hanging_gateway() -> OracleGateway<HangingOracle> {
    OracleGateway::new(HangingOracle, RoleTable::new(), Duration::from_secs(90))
}

pub(crate) fn incident(id: &str, severity: Severity) -> Incident {
    Incident {
        id: id.into(),
        species: "elephant".to_string(),
        gps: GeoPoint::new(6.35, 81.5),
        observed_behavior: "limping".to_string(),
        injury_severity: severity,
        reporter_reliability: 0.9,
        access_difficulty: "open".to_string(),
        priority: 3,
        timestamp: None,
    }
}
