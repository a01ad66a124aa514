//! RoleTable - role -> (prompt, fallback)

use std::collections::BTreeMap;

use contracts::{OracleRole, OracleSettings, RoleContract, RoleSpec};
use tracing::warn;

/// Per-role prompts and fallback values, built once from configuration
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: BTreeMap<OracleRole, RoleSpec>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &OracleSettings) -> Self {
        Self {
            roles: settings.roles.clone(),
        }
    }

    pub fn insert(&mut self, role: OracleRole, spec: RoleSpec) -> &mut Self {
        self.roles.insert(role, spec);
        self
    }

    /// Prompt for `role`, empty when none is configured
    pub fn prompt(&self, role: OracleRole) -> &str {
        self.roles.get(&role).map(|s| s.prompt.as_str()).unwrap_or("")
    }

    /// Configured fallback if it satisfies the contract, else the built-in one
    pub fn fallback<T: RoleContract>(&self) -> T {
        let configured = self
            .roles
            .get(&T::ROLE)
            .and_then(|spec| spec.fallback.clone());

        match configured.map(T::from_value) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                warn!(role = %T::ROLE, error = %e, "Configured fallback rejected, using built-in");
                T::builtin_fallback()
            }
            None => T::builtin_fallback(),
        }
    }
}
