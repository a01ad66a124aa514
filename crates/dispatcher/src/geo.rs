//! Geo model
//!
//! Pure functions over the static park tables.

use contracts::{DispatchSettings, GeoPoint, ParkBlueprint};

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in km (haversine)
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Usable speed (km/h) for a terrain multiplier and vehicle top speed
pub fn effective_speed_kmh(settings: &DispatchSettings, terrain_multiplier: f64, vehicle_max_kmh: f64) -> f64 {
    (settings.base_speed_kmh * terrain_multiplier).min(vehicle_max_kmh * settings.vehicle_speed_factor)
}

/// ETA in minutes from raw speed inputs
pub fn eta_minutes_with(
    settings: &DispatchSettings,
    distance_km: f64,
    terrain_multiplier: f64,
    vehicle_max_kmh: f64,
) -> f64 {
    let speed = effective_speed_kmh(settings, terrain_multiplier, vehicle_max_kmh);
    settings.mobilization_minutes + distance_km / speed * 60.0
}

/// ETA in minutes, looking terrain and vehicle up in the blueprint tables
pub fn eta_minutes(blueprint: &ParkBlueprint, distance_km: f64, terrain: &str, vehicle: &str) -> f64 {
    eta_minutes_with(
        &blueprint.dispatch,
        distance_km,
        blueprint.terrain_multiplier(terrain),
        blueprint.vehicle_max_speed(vehicle),
    )
}

/// Terrain label at `p`: first matching zone, else the default terrain
pub fn classify_terrain(blueprint: &ParkBlueprint, p: GeoPoint) -> &str {
    blueprint
        .terrain_zones
        .iter()
        .find(|zone| zone.contains(p))
        .map(|zone| zone.terrain.as_str())
        .unwrap_or(blueprint.default_terrain.as_str())
}

/// Human-readable place name
///
/// The nearest hotspot if `p` lies within its radius, otherwise
/// "near <nearest station>", otherwise the park name.
pub fn location_name(blueprint: &ParkBlueprint, p: GeoPoint) -> String {
    let nearest_hotspot = blueprint
        .hotspots
        .iter()
        .map(|h| (h, haversine_km(p, h.location)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((hotspot, d)) = nearest_hotspot {
        if d <= hotspot.radius_km {
            return hotspot.name.replace('_', " ");
        }
    }

    blueprint
        .stations
        .iter()
        .map(|s| (s, haversine_km(p, s.location)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| format!("near {}", s.name))
        .unwrap_or_else(|| blueprint.park.name.clone())
}
