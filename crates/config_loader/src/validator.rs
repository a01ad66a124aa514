//! Blueprint validation
//!
//! Rules:
//! - at least one station, station names unique and not the broadcast name
//! - every station has a vehicle and every vehicle is in the vehicle table
//! - coordinates within [-90, 90] / [-180, 180]
//! - terrain multipliers and vehicle speeds > 0
//! - default terrain and zone terrains exist in the terrain table
//! - dispatch window, base speed and requeue passes are usable
//! - configured oracle fallbacks satisfy their role contract

use std::collections::HashSet;

use contracts::{validate_role_output, ContractError, GeoPoint, ParkBlueprint, BROADCAST};

/// Validate a ParkBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    validate_stations(blueprint)?;
    validate_station_vehicles(blueprint)?;
    validate_coordinates(blueprint)?;
    validate_speed_tables(blueprint)?;
    validate_terrain_labels(blueprint)?;
    validate_dispatch(blueprint)?;
    validate_oracle(blueprint)?;
    Ok(())
}

/// Station presence and name uniqueness
fn validate_stations(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    if blueprint.stations.is_empty() {
        return Err(ContractError::config_validation(
            "stations",
            "at least one station is required",
        ));
    }

    let mut seen = HashSet::new();
    for station in &blueprint.stations {
        if station.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                "stations[].name",
                "station name cannot be empty",
            ));
        }
        if station.name == BROADCAST {
            return Err(ContractError::config_validation(
                format!("stations[name={}]", station.name),
                "station name is reserved",
            ));
        }
        if !seen.insert(station.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("stations[name={}]", station.name),
                "duplicate station name",
            ));
        }
    }
    Ok(())
}

/// Every station has a fleet drawn from the vehicle table
fn validate_station_vehicles(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    for station in &blueprint.stations {
        if station.vehicles.is_empty() {
            return Err(ContractError::config_validation(
                format!("stations[{}].vehicles", station.name),
                "station must have at least one vehicle",
            ));
        }
        for vehicle in &station.vehicles {
            if !blueprint.vehicles.contains_key(vehicle) {
                return Err(ContractError::config_validation(
                    format!("stations[{}].vehicles", station.name),
                    format!("unknown vehicle '{vehicle}'"),
                ));
            }
        }
    }
    Ok(())
}

fn check_point(field: String, p: GeoPoint) -> Result<(), ContractError> {
    if !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lon) {
        return Err(ContractError::config_validation(
            field,
            format!("coordinate out of range: ({}, {})", p.lat, p.lon),
        ));
    }
    Ok(())
}

fn validate_coordinates(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    check_point("park.center".into(), blueprint.park.center)?;
    for station in &blueprint.stations {
        check_point(format!("stations[{}].location", station.name), station.location)?;
    }
    for hotspot in &blueprint.hotspots {
        check_point(format!("hotspots[{}].location", hotspot.name), hotspot.location)?;
        if hotspot.radius_km <= 0.0 {
            return Err(ContractError::config_validation(
                format!("hotspots[{}].radius_km", hotspot.name),
                format!("radius_km must be > 0, got {}", hotspot.radius_km),
            ));
        }
    }
    Ok(())
}

/// Terrain multipliers and vehicle speeds
fn validate_speed_tables(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    for (name, terrain) in &blueprint.terrain {
        if terrain.speed_multiplier <= 0.0 {
            return Err(ContractError::config_validation(
                format!("terrain.{name}.speed_multiplier"),
                format!(
                    "speed_multiplier must be > 0, got {}",
                    terrain.speed_multiplier
                ),
            ));
        }
    }
    for (name, vehicle) in &blueprint.vehicles {
        if vehicle.max_speed_kmh <= 0.0 {
            return Err(ContractError::config_validation(
                format!("vehicles.{name}.max_speed_kmh"),
                format!("max_speed_kmh must be > 0, got {}", vehicle.max_speed_kmh),
            ));
        }
    }
    Ok(())
}

fn validate_terrain_labels(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    if !blueprint.terrain.contains_key(&blueprint.default_terrain) {
        return Err(ContractError::config_validation(
            "default_terrain",
            format!(
                "default_terrain '{}' not found in terrain table",
                blueprint.default_terrain
            ),
        ));
    }
    for (idx, zone) in blueprint.terrain_zones.iter().enumerate() {
        if !blueprint.terrain.contains_key(&zone.terrain) {
            return Err(ContractError::config_validation(
                format!("terrain_zones[{idx}].terrain"),
                format!("terrain '{}' not found in terrain table", zone.terrain),
            ));
        }
    }
    Ok(())
}

fn validate_dispatch(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    let dispatch = &blueprint.dispatch;

    if dispatch.window_ms == 0 {
        return Err(ContractError::config_validation(
            "dispatch.window_ms",
            "window_ms must be > 0",
        ));
    }
    if dispatch.base_speed_kmh <= 0.0 {
        return Err(ContractError::config_validation(
            "dispatch.base_speed_kmh",
            format!("base_speed_kmh must be > 0, got {}", dispatch.base_speed_kmh),
        ));
    }
    if dispatch.vehicle_speed_factor <= 0.0 {
        return Err(ContractError::config_validation(
            "dispatch.vehicle_speed_factor",
            format!(
                "vehicle_speed_factor must be > 0, got {}",
                dispatch.vehicle_speed_factor
            ),
        ));
    }
    if dispatch.default_terrain_multiplier <= 0.0 || dispatch.default_vehicle_max_speed_kmh <= 0.0
    {
        return Err(ContractError::config_validation(
            "dispatch.default_*",
            "fallback multiplier and speed must be > 0",
        ));
    }
    if dispatch.max_requeue_passes == 0 {
        return Err(ContractError::config_validation(
            "dispatch.max_requeue_passes",
            "max_requeue_passes must be >= 1",
        ));
    }
    Ok(())
}

/// Configured fallbacks must satisfy the same contract as live answers
fn validate_oracle(blueprint: &ParkBlueprint) -> Result<(), ContractError> {
    let oracle = &blueprint.oracle;

    if oracle.timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "oracle.timeout_ms",
            "timeout_ms must be > 0",
        ));
    }
    for (role, spec) in &oracle.roles {
        if let Some(fallback) = &spec.fallback {
            validate_role_output(*role, fallback).map_err(|e| {
                ContractError::config_validation(format!("oracle.roles.{role}.fallback"), e.to_string())
            })?;
        }
    }
    Ok(())
}
