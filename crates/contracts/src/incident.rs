//! Incident records - ingestion input and normalized form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Geographic coordinate (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Injury severity reported for an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incident identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(String);

impl IncidentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for records that arrive without one
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IncidentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Normalized incident record as delivered by an external producer.
///
/// `id` may be missing; [`IncidentDraft::into_incident`] synthesizes one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IncidentDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IncidentId>,

    #[validate(length(min = 1))]
    pub species: String,

    #[validate(nested)]
    pub gps: GeoPoint,

    #[serde(default = "unknown")]
    pub observed_behavior: String,

    #[serde(default)]
    pub injury_severity: Severity,

    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_reliability")]
    pub reporter_reliability: f64,

    #[serde(default = "default_access")]
    pub access_difficulty: String,

    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn default_reliability() -> f64 {
    0.5
}

fn default_access() -> String {
    "open".to_string()
}

fn default_priority() -> u8 {
    3
}

impl IncidentDraft {
    /// Normalize into an [`Incident`], synthesizing a missing or empty id and
    /// clamping numeric fields into their documented ranges.
    pub fn into_incident(self, received_at: DateTime<Utc>) -> Incident {
        let id = match self.id {
            Some(id) if !id.as_str().is_empty() => id,
            _ => IncidentId::generate(),
        };
        Incident {
            id,
            species: self.species,
            gps: self.gps,
            observed_behavior: self.observed_behavior,
            injury_severity: self.injury_severity,
            reporter_reliability: self.reporter_reliability.clamp(0.0, 1.0),
            access_difficulty: self.access_difficulty,
            priority: self.priority.clamp(1, 5),
            timestamp: Some(received_at),
        }
    }
}

/// Incident with a guaranteed identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: IncidentId,
    pub species: String,
    pub gps: GeoPoint,
    pub observed_behavior: String,
    pub injury_severity: Severity,
    pub reporter_reliability: f64,
    pub access_difficulty: String,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Who filed a raw report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterInfo {
    #[serde(rename = "type", default = "default_reporter_kind")]
    pub kind: String,
    #[serde(default = "default_reliability")]
    pub reliability: f64,
}

fn default_reporter_kind() -> String {
    "ranger".to_string()
}

impl Default for ReporterInfo {
    fn default() -> Self {
        Self {
            kind: default_reporter_kind(),
            reliability: default_reliability(),
        }
    }
}

/// Unstructured field report (ranger, citizen, camera trap)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub text: String,
    pub gps: GeoPoint,
    #[serde(default)]
    pub reporter: ReporterInfo,
}
