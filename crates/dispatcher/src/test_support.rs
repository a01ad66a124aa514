//! Shared fixtures for unit tests

use std::collections::BTreeMap;

use contracts::{
    CapabilityRules, ConfigVersion, DispatchSettings, GeoPoint, Incident, IncidentId,
    OracleSettings, ParkBlueprint, ParkInfo, Severity, SpeciesProfile, StationConfig, TerrainSpec,
    TerrainZone, VehicleClass, VehicleSpec,
};

fn station(name: &str, vehicles: &[&str], equipment: &[&str], lat: f64, lon: f64) -> StationConfig {
    StationConfig {
        name: name.to_string(),
        vehicles: vehicles.iter().map(|s| s.to_string()).collect(),
        staff_count: 4,
        equipment: equipment.iter().map(|s| s.to_string()).collect(),
        description: String::new(),
        location: GeoPoint::new(lat, lon),
    }
}

fn vehicle(max_speed_kmh: f64, class: VehicleClass) -> VehicleSpec {
    VehicleSpec {
        max_speed_kmh,
        class,
        capacity: 4,
        equipment: vec![],
    }
}

pub(crate) fn blueprint() -> ParkBlueprint {
    let terrain = BTreeMap::from([
        (
            "grassland".to_string(),
            TerrainSpec {
                speed_multiplier: 1.0,
                description: String::new(),
            },
        ),
        (
            "forest".to_string(),
            TerrainSpec {
                speed_multiplier: 0.5,
                description: String::new(),
            },
        ),
    ]);
    let vehicles = BTreeMap::from([
        ("Jeep".to_string(), vehicle(80.0, VehicleClass::Patrol)),
        ("Ambulance".to_string(), vehicle(70.0, VehicleClass::Ambulance)),
        ("Truck".to_string(), vehicle(50.0, VehicleClass::HeavyRescue)),
    ]);
    let species = BTreeMap::from([
        (
            "elephant".to_string(),
            SpeciesProfile {
                requires_capture: true,
                prefers_heavy_rescue: true,
                ..Default::default()
            },
        ),
        (
            "leopard".to_string(),
            SpeciesProfile {
                requires_capture: true,
                ..Default::default()
            },
        ),
    ]);

    ParkBlueprint {
        version: ConfigVersion::V1,
        default_terrain: "grassland".to_string(),
        park: ParkInfo {
            name: "Fixture Park".to_string(),
            center: GeoPoint::new(6.3, 81.5),
            bounds: None,
        },
        dispatch: DispatchSettings::default(),
        capability: CapabilityRules::default(),
        stations: vec![
            station(
                "Alpha",
                &["Jeep", "Ambulance", "Truck"],
                &["first_aid", "tranquilizer_kit"],
                6.30,
                81.50,
            ),
            station("Bravo", &["Jeep"], &[], 6.40, 81.50),
            station(
                "Charlie",
                &["Jeep", "Truck"],
                &["first_aid", "tranquilizer_kit"],
                6.20,
                81.50,
            ),
        ],
        terrain,
        vehicles,
        species,
        terrain_zones: vec![TerrainZone {
            terrain: "forest".to_string(),
            lat_above: None,
            lat_below: None,
            lon_above: None,
            lon_below: Some(81.45),
        }],
        hotspots: vec![],
        oracle: OracleSettings::default(),
    }
}

pub(crate) fn incident(species: &str, severity: Severity, lat: f64, lon: f64) -> Incident {
    Incident {
        id: IncidentId::new("INC-1"),
        species: species.to_string(),
        gps: GeoPoint::new(lat, lon),
        observed_behavior: "limping".to_string(),
        injury_severity: severity,
        reporter_reliability: 0.8,
        access_difficulty: "open".to_string(),
        priority: 3,
        timestamp: None,
    }
}
