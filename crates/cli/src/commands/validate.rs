//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{OracleRole, ParkBlueprint};
use serde::Serialize;
use tracing::info;

use super::{describe_source, load_blueprint};
use crate::cli::ValidateArgs;

#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BlueprintSummary>,
}

#[derive(Serialize)]
struct BlueprintSummary {
    park: String,
    stations: usize,
    vehicles: usize,
    terrain_types: usize,
    species_profiles: usize,
    hotspots: usize,
}

pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let path = args.config.as_deref();
    info!(config = %describe_source(path), "Validating blueprint");

    let result = match load_blueprint(path) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path: describe_source(path),
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(BlueprintSummary {
                park: blueprint.park.name.clone(),
                stations: blueprint.stations.len(),
                vehicles: blueprint.vehicles.len(),
                terrain_types: blueprint.terrain.len(),
                species_profiles: blueprint.species.len(),
                hotspots: blueprint.hotspots.len(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path: describe_source(path),
            error: Some(format!("{e:#}")),
            warnings: Vec::new(),
            summary: None,
        },
    };

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Blueprint validation failed")
    }
}

/// Non-fatal issues
fn collect_warnings(blueprint: &ParkBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let rules = &blueprint.capability;

    for station in &blueprint.stations {
        if !station.equipment.iter().any(|e| e == &rules.first_aid_item) {
            warnings.push(format!(
                "Station '{}' has no '{}': never capable for urgent incidents",
                station.name, rules.first_aid_item
            ));
        }
        if station.staff_count == 0 {
            warnings.push(format!("Station '{}' has no staff", station.name));
        }
    }

    if blueprint.hotspots.is_empty() {
        warnings.push("No hotspots: location names fall back to the nearest station".to_string());
    }

    for role in OracleRole::ALL {
        if !blueprint.oracle.roles.contains_key(&role) {
            warnings.push(format!("No prompt configured for oracle role '{role}'"));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if !result.valid {
        println!("✗ Blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
        return;
    }

    println!("✓ Blueprint is valid: {}", result.config_path);
    if let Some(ref summary) = result.summary {
        println!("\n  Park: {}", summary.park);
        println!("  Stations: {}", summary.stations);
        println!("  Vehicles: {}", summary.vehicles);
        println!("  Terrain types: {}", summary.terrain_types);
        println!("  Species profiles: {}", summary.species_profiles);
        println!("  Hotspots: {}", summary.hotspots);
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}
