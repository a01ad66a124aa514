//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_sanctuary;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ParkBlueprint;

/// Blueprint at `path`, or the bundled one
fn load_blueprint(path: Option<&Path>) -> Result<ParkBlueprint> {
    config_loader::ConfigLoader::load_or_builtin(path).with_context(|| match path {
        Some(p) => format!("Failed to load blueprint from {}", p.display()),
        None => "Failed to load bundled blueprint".to_string(),
    })
}

fn describe_source(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<bundled>".to_string())
}
