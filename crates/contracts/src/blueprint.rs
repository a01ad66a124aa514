//! ParkBlueprint - Config Loader output
//!
//! Complete static configuration of a park: stations, terrain and vehicle
//! tables, species profiles, dispatch tuning and the oracle role table.
//! Loaded once at startup and treated as immutable for the run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{GeoPoint, OracleRole, Severity};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete park configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Terrain label used when no zone rule matches
    pub default_terrain: String,

    /// Park identity and bounds
    pub park: ParkInfo,

    /// Dispatch protocol tuning
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Equipment requirements
    #[serde(default)]
    pub capability: CapabilityRules,

    /// Responder stations, in registration order
    pub stations: Vec<StationConfig>,

    /// Terrain label -> speed characteristics
    pub terrain: BTreeMap<String, TerrainSpec>,

    /// Vehicle name -> speed, class and capacity
    pub vehicles: BTreeMap<String, VehicleSpec>,

    /// Species name -> handling profile
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesProfile>,

    /// Ordered terrain classification rules (first match wins)
    #[serde(default)]
    pub terrain_zones: Vec<TerrainZone>,

    /// Named places used for human-readable locations
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,

    /// Reasoning oracle settings and role table
    #[serde(default)]
    pub oracle: OracleSettings,
}

impl ParkBlueprint {
    /// Station names in configuration order
    pub fn station_names(&self) -> Vec<String> {
        self.stations.iter().map(|s| s.name.clone()).collect()
    }

    pub fn station(&self, name: &str) -> Option<&StationConfig> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// Speed multiplier for a terrain label, falling back to the configured default
    pub fn terrain_multiplier(&self, terrain: &str) -> f64 {
        self.terrain
            .get(terrain)
            .map(|t| t.speed_multiplier)
            .unwrap_or(self.dispatch.default_terrain_multiplier)
    }

    /// Max speed for a vehicle, falling back to the configured default
    pub fn vehicle_max_speed(&self, vehicle: &str) -> f64 {
        self.vehicles
            .get(vehicle)
            .map(|v| v.max_speed_kmh)
            .unwrap_or(self.dispatch.default_vehicle_max_speed_kmh)
    }

    pub fn vehicle_class(&self, vehicle: &str) -> Option<VehicleClass> {
        self.vehicles.get(vehicle).map(|v| v.class)
    }

    /// Species profile; unknown species need nothing special
    pub fn species_profile(&self, species: &str) -> SpeciesProfile {
        self.species.get(species).cloned().unwrap_or_default()
    }
}

/// Park identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkInfo {
    pub name: String,
    pub center: GeoPoint,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

/// Rectangular bounds (degrees)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }
}

/// Dispatch protocol tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Collection window per round (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Average vehicle speed in mixed terrain (km/h)
    #[serde(default = "default_base_speed")]
    pub base_speed_kmh: f64,

    /// Fixed mobilization overhead added to every ETA (minutes)
    #[serde(default = "default_mobilization")]
    pub mobilization_minutes: f64,

    /// Share of vehicle max speed usable in the field
    #[serde(default = "default_vehicle_speed_factor")]
    pub vehicle_speed_factor: f64,

    /// Multiplier for terrain labels missing from the terrain table
    #[serde(default = "default_terrain_multiplier")]
    pub default_terrain_multiplier: f64,

    /// Max speed for vehicles missing from the vehicle table (km/h)
    #[serde(default = "default_vehicle_max_speed")]
    pub default_vehicle_max_speed_kmh: f64,

    /// How many rounds may defer one envelope before it counts as misrouted
    #[serde(default = "default_max_requeue_passes")]
    pub max_requeue_passes: u32,

    /// Send a treatment request to the vet after each dispatch
    #[serde(default)]
    pub vet_trigger: bool,

    /// Simulated treatment duration per expected minute (ms)
    #[serde(default = "default_treatment_ms_per_minute")]
    pub treatment_ms_per_minute: u64,

    /// Upper bound on simulated treatment duration (ms)
    #[serde(default = "default_treatment_cap_ms")]
    pub treatment_cap_ms: u64,
}

fn default_window_ms() -> u64 {
    2000
}

fn default_base_speed() -> f64 {
    40.0
}

fn default_mobilization() -> f64 {
    5.0
}

fn default_vehicle_speed_factor() -> f64 {
    0.8
}

fn default_terrain_multiplier() -> f64 {
    0.7
}

fn default_vehicle_max_speed() -> f64 {
    50.0
}

fn default_max_requeue_passes() -> u32 {
    3
}

fn default_treatment_ms_per_minute() -> u64 {
    100
}

fn default_treatment_cap_ms() -> u64 {
    5000
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            base_speed_kmh: default_base_speed(),
            mobilization_minutes: default_mobilization(),
            vehicle_speed_factor: default_vehicle_speed_factor(),
            default_terrain_multiplier: default_terrain_multiplier(),
            default_vehicle_max_speed_kmh: default_vehicle_max_speed(),
            max_requeue_passes: default_max_requeue_passes(),
            vet_trigger: false,
            treatment_ms_per_minute: default_treatment_ms_per_minute(),
            treatment_cap_ms: default_treatment_cap_ms(),
        }
    }
}

impl DispatchSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Simulated duration of a treatment expected to take `minutes`
    pub fn treatment_duration(&self, minutes: u32) -> Duration {
        let ms = (minutes as u64).saturating_mul(self.treatment_ms_per_minute);
        Duration::from_millis(ms.min(self.treatment_cap_ms))
    }
}

/// Equipment requirements derived from an incident
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRules {
    /// Item required for urgent injuries
    #[serde(default = "default_first_aid_item")]
    pub first_aid_item: String,

    /// Item required for species that need capture
    #[serde(default = "default_capture_item")]
    pub capture_item: String,

    /// Severities that require the first-aid item
    #[serde(default = "default_urgent_severities")]
    pub urgent_severities: Vec<Severity>,
}

fn default_first_aid_item() -> String {
    "first_aid".to_string()
}

fn default_capture_item() -> String {
    "tranquilizer_kit".to_string()
}

fn default_urgent_severities() -> Vec<Severity> {
    vec![Severity::High, Severity::Critical]
}

impl Default for CapabilityRules {
    fn default() -> Self {
        Self {
            first_aid_item: default_first_aid_item(),
            capture_item: default_capture_item(),
            urgent_severities: default_urgent_severities(),
        }
    }
}

/// Responder station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Unique station name, also its actor name
    pub name: String,

    /// Vehicle names, first is the default choice
    pub vehicles: Vec<String>,

    pub staff_count: u32,

    #[serde(default)]
    pub equipment: Vec<String>,

    #[serde(default)]
    pub description: String,

    pub location: GeoPoint,
}

/// Terrain speed characteristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub speed_multiplier: f64,
    #[serde(default)]
    pub description: String,
}

/// Vehicle class used by the vehicle precedence rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Ambulance,
    HeavyRescue,
    Patrol,
    Veterinary,
    Command,
    Motorcycle,
    Capture,
}

/// Vehicle performance and class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub max_speed_kmh: f64,
    pub class: VehicleClass,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// Species handling profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// Large or dangerous: responders need the capture item
    #[serde(default)]
    pub requires_capture: bool,

    /// Prefer a heavy-rescue vehicle when the station has one
    #[serde(default)]
    pub prefers_heavy_rescue: bool,

    #[serde(default)]
    pub scientific_name: Option<String>,

    #[serde(default)]
    pub threat_level: Option<String>,
}

/// Terrain classification rule; all present bounds are strict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainZone {
    pub terrain: String,
    #[serde(default)]
    pub lat_above: Option<f64>,
    #[serde(default)]
    pub lat_below: Option<f64>,
    #[serde(default)]
    pub lon_above: Option<f64>,
    #[serde(default)]
    pub lon_below: Option<f64>,
}

impl TerrainZone {
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.lat_above.is_none_or(|v| p.lat > v)
            && self.lat_below.is_none_or(|v| p.lat < v)
            && self.lon_above.is_none_or(|v| p.lon > v)
            && self.lon_below.is_none_or(|v| p.lon < v)
    }
}

/// Named wildlife hotspot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub name: String,
    pub radius_km: f64,
    #[serde(default)]
    pub common_species: Vec<String>,
    pub location: GeoPoint,
}

/// Reasoning oracle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Per-call timeout (ms)
    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,

    /// Remote gateway endpoint (HTTP oracle only)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Role -> prompt and fallback
    #[serde(default)]
    pub roles: BTreeMap<OracleRole, RoleSpec>,
}

fn default_oracle_timeout_ms() -> u64 {
    90_000
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_oracle_timeout_ms(),
            endpoint: None,
            roles: BTreeMap::new(),
        }
    }
}

impl OracleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Prompt and optional fallback for one oracle role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSpec {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<serde_json::Value>,
}
