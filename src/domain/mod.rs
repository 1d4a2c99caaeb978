/// Domain models for the dashboard state engine
pub mod backend;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use backend::{SpaceWeatherSnapshot, WeatherThreat};

/// Operational status shown for a tracked satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SatelliteStatus {
    #[default]
    Active,
    Warning,
    Critical,
}

/// Threat level reported by the fleet analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ThreatLevel {
    /// Status the roster shows for a satellite at this threat level
    pub fn status(self) -> SatelliteStatus {
        match self {
            ThreatLevel::Critical => SatelliteStatus::Critical,
            ThreatLevel::High => SatelliteStatus::Warning,
            _ => SatelliteStatus::Active,
        }
    }
}

/// Last known position of a satellite (degrees, km)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vz: Option<f64>,
}

/// Collision-probability figures for a satellite's closest reported event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CollisionSummary {
    pub pc_2d: Option<f64>,
    pub pc_3d: Option<f64>,
    pub pc_mc: Option<f64>,
    pub mahalanobis_distance: Option<f64>,
    pub safety_level: Option<String>,
}

/// A tracked satellite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: String,
    pub name: String,
    pub tle1: String,
    pub tle2: String,
    pub color: String,
    pub status: SatelliteStatus,
    pub position: Option<Position>,
    pub threat_level: Option<ThreatLevel>,
    pub collision: Option<CollisionSummary>,
}

/// User input for adding a satellite to the roster
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewSatellite {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tle1: String,
    #[serde(default)]
    pub tle2: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Conjunction,
    SpaceWeather,
    System,
}

/// Alert severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a backend level label. `MODERATE` is the backend's word for medium.
    pub fn from_level(level: &str) -> Option<Self> {
        match level.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Some(Severity::Critical),
            "HIGH" => Some(Severity::High),
            "MEDIUM" | "MODERATE" => Some(Severity::Medium),
            "LOW" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Extended view of an alert, filled on first request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDetails {
    pub collision_probability: f64,
    pub relative_speed_km_s: f64,
    pub recommended_action: String,
    pub confidence: f64,
    pub estimated_impact: String,
}

/// User-facing notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub satellite: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_speed_km_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<AlertDetails>,
    pub acknowledged: bool,
}

/// Maneuver recommended by the backend for a conjunction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ManeuverAction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timing: String,
    #[serde(default)]
    pub delta_v_estimate: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub fuel_cost: String,
}

/// Payload of a decision, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Conjunction {
        event_with: String,
        tca: String,
        distance_km: f64,
        relative_speed_km_s: Option<f64>,
        action: ManeuverAction,
    },
    WeatherMitigation {
        threat_type: String,
        priority: Severity,
        recommendation: String,
        impact: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
    Executing,
    Completed,
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionStatus::Pending => "pending",
            DecisionStatus::Approved => "approved",
            DecisionStatus::Rejected => "rejected",
            DecisionStatus::Executing => "executing",
            DecisionStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Workflow actions that move a decision between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
    Execute,
    Complete,
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionAction::Approve => "approve",
            DecisionAction::Reject => "reject",
            DecisionAction::Execute => "execute",
            DecisionAction::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Maneuver or mitigation recommendation awaiting an operator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub satellite: String,
    pub satellite_id: String,
    pub suggestion: Suggestion,
    pub status: DecisionStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Space weather as the dashboard presents it: the latest snapshot, or the
/// error that blocks the view until a retry succeeds
#[derive(Debug, Clone, Serialize)]
pub struct WeatherState {
    pub snapshot: Option<SpaceWeatherSnapshot>,
    pub error: Option<String>,
    pub scope: Option<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: chrono::DateTime<chrono::Utc>,
    pub backend: serde_json::Value,
}
