//! HttpOracle - remote agent gateway over HTTP

use contracts::{ContractError, OracleRole, ReasoningOracle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Request body for the agent gateway
#[derive(Serialize)]
struct RunAgentRequest<'a> {
    agent: &'a str,
    prompt: &'a str,
    context: &'a Value,
}

/// Response from the agent gateway
#[derive(Deserialize)]
struct RunAgentResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    /// # Arguments
    /// * `endpoint` - Full URL of the run-agent route (e.g. "http://localhost:8001/run_agent")
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReasoningOracle for HttpOracle {
    async fn run(
        &self,
        role: OracleRole,
        prompt: &str,
        context: &Value,
    ) -> Result<Value, ContractError> {
        let request = RunAgentRequest {
            agent: role.agent_label(),
            prompt,
            context,
        };

        debug!(%role, endpoint = %self.endpoint, "Calling agent gateway");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ContractError::oracle_call(role, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::oracle_call(
                role,
                format!("gateway returned status {status}"),
            ));
        }

        let body: RunAgentResponse = response
            .json()
            .await
            .map_err(|e| ContractError::oracle_call(role, format!("malformed body: {e}")))?;
        Ok(body.result)
    }
}
