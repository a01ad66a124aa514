//! Layered error definitions
//!
//! Categorized by source: config / oracle / sink

use thiserror::Error;

use crate::OracleRole;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Oracle Errors =====
    /// Oracle call failed (transport, status, malformed body)
    #[error("oracle call for role '{role}' failed: {message}")]
    OracleCall { role: OracleRole, message: String },

    /// Oracle did not answer within the configured timeout
    #[error("oracle call for role '{role}' timed out after {waited_ms}ms")]
    OracleTimeout { role: OracleRole, waited_ms: u64 },

    /// Oracle answered with a value that breaks the role contract
    #[error("oracle output for role '{role}' violates contract: {message}")]
    ContractViolation { role: OracleRole, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create oracle call error
    pub fn oracle_call(role: OracleRole, message: impl Into<String>) -> Self {
        Self::OracleCall {
            role,
            message: message.into(),
        }
    }

    /// Create contract violation error
    pub fn contract_violation(role: OracleRole, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            role,
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
