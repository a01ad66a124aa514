//! Capability model
//!
//! What an incident needs, whether a station has it, and which vehicle it
//! sends.

use std::collections::BTreeSet;

use contracts::{Incident, ParkBlueprint, Severity, StationConfig, VehicleClass};

/// Confidence reported when the station holds the required equipment
pub const CONFIDENCE_EQUIPPED: f64 = 0.9;
/// Confidence reported otherwise
pub const CONFIDENCE_UNEQUIPPED: f64 = 0.5;

/// Capability assessment of one station for one incident
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    pub required: BTreeSet<String>,
    pub has_equipment: bool,
    /// Equipped and not busy
    pub capable: bool,
    pub vehicle: String,
    pub confidence: f64,
}

/// Equipment an incident requires
pub fn required_equipment(blueprint: &ParkBlueprint, incident: &Incident) -> BTreeSet<String> {
    let rules = &blueprint.capability;
    let mut required = BTreeSet::new();
    if rules.urgent_severities.contains(&incident.injury_severity) {
        required.insert(rules.first_aid_item.clone());
    }
    if blueprint.species_profile(&incident.species).requires_capture {
        required.insert(rules.capture_item.clone());
    }
    required
}

/// Vehicle the station would send
///
/// Critical injuries take the first ambulance-class vehicle, species that
/// prefer heavy rescue take the first heavy-rescue vehicle, anything else
/// takes the first configured vehicle.
pub fn best_vehicle<'a>(
    blueprint: &ParkBlueprint,
    station: &'a StationConfig,
    incident: &Incident,
) -> &'a str {
    let first_of = |class: VehicleClass| {
        station
            .vehicles
            .iter()
            .find(|v| blueprint.vehicle_class(v) == Some(class))
    };

    let preferred = if incident.injury_severity == Severity::Critical {
        first_of(VehicleClass::Ambulance)
    } else {
        None
    };
    let preferred = preferred.or_else(|| {
        if blueprint.species_profile(&incident.species).prefers_heavy_rescue {
            first_of(VehicleClass::HeavyRescue)
        } else {
            None
        }
    });

    preferred
        .or_else(|| station.vehicles.first())
        .map(String::as_str)
        .unwrap_or_default()
}

/// Assess `station` for `incident`
pub fn assess(
    blueprint: &ParkBlueprint,
    station: &StationConfig,
    incident: &Incident,
    busy: bool,
) -> Capability {
    let required = required_equipment(blueprint, incident);
    let has_equipment = required
        .iter()
        .all(|item| station.equipment.iter().any(|e| e == item));

    Capability {
        capable: has_equipment && !busy,
        vehicle: best_vehicle(blueprint, station, incident).to_string(),
        confidence: if has_equipment {
            CONFIDENCE_EQUIPPED
        } else {
            CONFIDENCE_UNEQUIPPED
        },
        required,
        has_equipment,
    }
}
