//! OracleBackend - runtime choice between the available backends

use contracts::{ContractError, OracleRole, ReasoningOracle};
use serde_json::Value;

#[cfg(feature = "http-oracle")]
use crate::HttpOracle;
use crate::StubOracle;

/// Backend selected at startup
#[derive(Debug, Clone)]
pub enum OracleBackend {
    Stub(StubOracle),
    #[cfg(feature = "http-oracle")]
    Http(HttpOracle),
}

impl OracleBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stub(_) => "stub",
            #[cfg(feature = "http-oracle")]
            Self::Http(_) => "http",
        }
    }
}

impl Default for OracleBackend {
    fn default() -> Self {
        Self::Stub(StubOracle)
    }
}

impl ReasoningOracle for OracleBackend {
    async fn run(
        &self,
        role: OracleRole,
        prompt: &str,
        context: &Value,
    ) -> Result<Value, ContractError> {
        match self {
            Self::Stub(o) => o.run(role, prompt, context).await,
            #[cfg(feature = "http-oracle")]
            Self::Http(o) => o.run(role, prompt, context).await,
        }
    }
}
