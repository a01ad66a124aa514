//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::ParkBlueprint;
use serde::Serialize;
use tracing::info;

use super::{describe_source, load_blueprint};
use crate::cli::InfoArgs;

#[derive(Serialize)]
struct BlueprintInfo {
    park: String,
    dispatch_window_ms: u64,
    vet_trigger: bool,
    oracle_timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    oracle_endpoint: Option<String>,
    stations: Vec<StationInfo>,
    hotspots: Vec<String>,
}

#[derive(Serialize)]
struct StationInfo {
    name: String,
    lat: f64,
    lon: f64,
    staff_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vehicles: Vec<VehicleInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    equipment: Vec<String>,
}

#[derive(Serialize)]
struct VehicleInfo {
    name: String,
    class: String,
    max_speed_kmh: f64,
}

pub fn run_info(args: &InfoArgs) -> Result<()> {
    let path = args.config.as_deref();
    info!(config = %describe_source(path), "Loading blueprint info");

    let blueprint = load_blueprint(path)?;
    let info = build_info(&blueprint, args.stations);

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize blueprint info")?;
        println!("{json}");
    } else {
        print_info(&info, args.stations);
    }
    Ok(())
}

fn build_info(blueprint: &ParkBlueprint, detailed: bool) -> BlueprintInfo {
    let stations = blueprint
        .stations
        .iter()
        .map(|s| {
            let vehicles = if detailed {
                s.vehicles
                    .iter()
                    .map(|v| VehicleInfo {
                        name: v.clone(),
                        class: blueprint
                            .vehicle_class(v)
                            .map(|c| format!("{c:?}"))
                            .unwrap_or_else(|| "unknown".to_string()),
                        max_speed_kmh: blueprint.vehicle_max_speed(v),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            StationInfo {
                name: s.name.clone(),
                lat: s.location.lat,
                lon: s.location.lon,
                staff_count: s.staff_count,
                vehicles,
                equipment: if detailed { s.equipment.clone() } else { Vec::new() },
            }
        })
        .collect();

    BlueprintInfo {
        park: blueprint.park.name.clone(),
        dispatch_window_ms: blueprint.dispatch.window_ms,
        vet_trigger: blueprint.dispatch.vet_trigger,
        oracle_timeout_ms: blueprint.oracle.timeout_ms,
        oracle_endpoint: blueprint.oracle.endpoint.clone(),
        stations,
        hotspots: blueprint.hotspots.iter().map(|h| h.name.clone()).collect(),
    }
}

fn print_info(info: &BlueprintInfo, detailed: bool) {
    println!("\n=== {} ===\n", info.park);
    println!("Dispatch window: {} ms", info.dispatch_window_ms);
    println!("Vet trigger: {}", info.vet_trigger);
    println!("Oracle timeout: {} ms", info.oracle_timeout_ms);
    if let Some(ref endpoint) = info.oracle_endpoint {
        println!("Oracle endpoint: {endpoint}");
    }

    println!("\nStations ({}):", info.stations.len());
    for s in &info.stations {
        println!("  - {} ({:.4}, {:.4}), staff {}", s.name, s.lat, s.lon, s.staff_count);
        if detailed {
            for v in &s.vehicles {
                println!("      {} [{}] {:.0} km/h", v.name, v.class, v.max_speed_kmh);
            }
            if !s.equipment.is_empty() {
                println!("      equipment: {}", s.equipment.join(", "));
            }
        }
    }

    if !info.hotspots.is_empty() {
        println!("\nHotspots: {}", info.hotspots.join(", "));
    }
    println!();
}
