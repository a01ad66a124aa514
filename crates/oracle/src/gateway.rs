//! OracleGateway - timeout, contract check and fallback around one backend

use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, OracleSettings, ReasoningOracle, RoleContract};
use tracing::{debug, instrument, warn};

use crate::RoleTable;

/// Where a decision came from
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    /// The oracle answered within the timeout and the answer passed the contract
    Oracle(T),
    /// Any failure; the role's fallback was substituted
    Fallback(T),
}

impl<T> Decision<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Oracle(_) => "oracle",
            Self::Fallback(_) => "fallback",
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Oracle(v) | Self::Fallback(v) => v,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Oracle(v) | Self::Fallback(v) => v,
        }
    }
}

/// Shared, clonable oracle front-end
pub struct OracleGateway<O> {
    oracle: Arc<O>,
    roles: Arc<RoleTable>,
    timeout: Duration,
}

impl<O> Clone for OracleGateway<O> {
    fn clone(&self) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            roles: Arc::clone(&self.roles),
            timeout: self.timeout,
        }
    }
}

impl<O> OracleGateway<O>
where
    O: ReasoningOracle + Send + Sync + 'static,
{
    pub fn new(oracle: O, roles: RoleTable, timeout: Duration) -> Self {
        Self {
            oracle: Arc::new(oracle),
            roles: Arc::new(roles),
            timeout,
        }
    }

    /// Gateway configured from the blueprint's oracle section
    pub fn from_settings(oracle: O, settings: &OracleSettings) -> Self {
        Self::new(oracle, RoleTable::from_settings(settings), settings.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Ask the oracle for `T`'s role over `context`
    ///
    /// Never fails and never waits longer than the configured timeout.
    #[instrument(name = "oracle_decide", skip(self, context), fields(role = %T::ROLE))]
    pub async fn decide<T: RoleContract>(&self, context: &serde_json::Value) -> Decision<T> {
        let role = T::ROLE;
        let prompt = self.roles.prompt(role);

        let result = match tokio::time::timeout(self.timeout, self.oracle.run(role, prompt, context))
            .await
        {
            Ok(Ok(value)) => T::from_value(value),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ContractError::OracleTimeout {
                role,
                waited_ms: self.timeout.as_millis() as u64,
            }),
        };

        let decision = match result {
            Ok(value) => {
                debug!(%role, "Oracle answer accepted");
                Decision::Oracle(value)
            }
            Err(e) => {
                warn!(%role, error = %e, "Oracle failed, using fallback");
                Decision::Fallback(self.roles.fallback::<T>())
            }
        };

        metrics::counter!(
            "wildguard_oracle_calls_total",
            "role" => role.as_str(),
            "source" => decision.source()
        )
        .increment(1);

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OracleRole, PublicMessage, TreatmentDecision, TriageSummary};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Oracle that answers with a fixed value after an optional delay
    struct FixedOracle {
        answer: Result<Value, String>,
        delay: Duration,
        calls: AtomicU32,
    }

    impl FixedOracle {
        fn ok(answer: Value) -> Self {
            Self {
                answer: Ok(answer),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err("connection refused".into()),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                answer: Ok(json!({})),
                delay,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl ReasoningOracle for FixedOracle {
        async fn run(
            &self,
            role: OracleRole,
            _prompt: &str,
            _context: &Value,
        ) -> Result<Value, ContractError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer
                .clone()
                .map_err(|m| ContractError::oracle_call(role, m))
        }
    }

    fn gateway(oracle: FixedOracle) -> OracleGateway<FixedOracle> {
        OracleGateway::new(oracle, RoleTable::new(), Duration::from_secs(90))
    }

    #[tokio::test]
    async fn test_valid_answer_is_used() {
        let gw = gateway(FixedOracle::ok(json!({
            "decision": "decline",
            "reason": "at capacity",
            "expected_treatment_time": 0
        })));
        let decision: Decision<TreatmentDecision> = gw.decide(&json!({})).await;
        assert!(!decision.is_fallback());
        assert!(!decision.into_inner().is_accepted());
    }

    #[tokio::test]
    async fn test_invalid_shape_falls_back() {
        let gw = gateway(FixedOracle::ok(json!({ "priority": 9 })));
        let decision: Decision<TriageSummary> = gw.decide(&json!({})).await;
        assert!(decision.is_fallback());
        assert_eq!(decision.get().priority, 3);
    }

    #[tokio::test]
    async fn test_call_error_falls_back() {
        let gw = gateway(FixedOracle::failing());
        let decision: Decision<PublicMessage> = gw.decide(&json!({})).await;
        assert_eq!(decision, Decision::Fallback(PublicMessage::builtin_fallback()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_without_waiting_longer() {
        let gw = gateway(FixedOracle::slow(Duration::from_secs(600)));
        let start = tokio::time::Instant::now();

        let decision: Decision<TreatmentDecision> = gw.decide(&json!({})).await;

        assert!(decision.is_fallback());
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(90));
        assert!(waited < Duration::from_secs(91));
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let gw = gateway(FixedOracle::failing());
        let other = gw.clone();
        let _: Decision<PublicMessage> = gw.decide(&json!({})).await;
        let _: Decision<PublicMessage> = other.decide(&json!({})).await;
        assert_eq!(gw.oracle.calls.load(Ordering::Relaxed), 2);
    }
}
