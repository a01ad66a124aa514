//! # Config Loader
//!
//! Park blueprint loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON blueprint files
//! - Validate station, terrain and vehicle tables before the run starts
//! - Provide the bundled default park
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("park.toml")).unwrap();
//! println!("Park: {}", blueprint.park.name);
//! ```

mod parser;
mod validator;

pub use contracts::ParkBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Bundled Yala sanctuary blueprint
const BUILTIN_TOML: &str = include_str!("../../../config/yala.toml");

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ParkBlueprint, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let blueprint = Self::load_from_str(&content, format)?;
        tracing::debug!(
            path = %path.display(),
            park = %blueprint.park.name,
            stations = blueprint.stations.len(),
            "Blueprint loaded"
        );
        Ok(blueprint)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ParkBlueprint, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// The bundled default park (Yala)
    pub fn builtin() -> Result<ParkBlueprint, ContractError> {
        Self::parse_and_validate(BUILTIN_TOML, ConfigFormat::Toml)
    }

    /// Load from `path` when given, otherwise the bundled default
    pub fn load_or_builtin(path: Option<&Path>) -> Result<ParkBlueprint, ContractError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::builtin(),
        }
    }

    /// Serialize ParkBlueprint to JSON string
    pub fn to_json(blueprint: &ParkBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ParkBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}
