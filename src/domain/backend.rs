/// Wire contract of the orbital analysis backend
use super::{ManeuverAction, Position, Satellite, ThreatLevel};
use serde::{Deserialize, Serialize};

/// Satellite as sent to `/positions` and `/analyze-fleet`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteRef {
    pub id: String,
    pub name: String,
    pub tle1: String,
    pub tle2: String,
    pub color: String,
}

impl From<&Satellite> for SatelliteRef {
    fn from(sat: &Satellite) -> Self {
        Self {
            id: sat.id.clone(),
            name: sat.name.clone(),
            tle1: sat.tle1.clone(),
            tle2: sat.tle2.clone(),
            color: sat.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionsRequest<'a> {
    pub satellites: &'a [SatelliteRef],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionsResponse {
    #[serde(default)]
    pub positions: Vec<PositionResult>,
}

/// Per-satellite entry of a positions response. Failed propagations carry
/// `error` and no position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionResult {
    pub id: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub space_weather: Option<SpaceWeatherSnapshot>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetAnalysisRequest<'a> {
    pub satellites: &'a [SatelliteRef],
    pub window_hours: f64,
    pub step_seconds: f64,
    pub threshold_km: f64,
    pub max_catalog: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetAnalysisResponse {
    #[serde(default)]
    pub satellites: Vec<SatelliteAnalysis>,
    #[serde(default)]
    pub meta: Option<AnalysisMeta>,
}

/// Screening context reported alongside a fleet analysis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisMeta {
    #[serde(default)]
    pub catalog_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SatelliteAnalysis {
    pub satellite_id: String,
    #[serde(default)]
    pub satellite_name: Option<String>,
    #[serde(default)]
    pub threat_level: ThreatLevel,
    #[serde(default)]
    pub events: Vec<ConjunctionEvent>,
    #[serde(default)]
    pub suggestions: Vec<ManeuverSuggestion>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConjunctionEvent {
    pub other_name: String,
    pub min_distance_km: f64,
    #[serde(default)]
    pub tca_utc: Option<String>,
    #[serde(default)]
    pub rel_speed_km_s: Option<f64>,
    #[serde(default)]
    pub collision_probability: Option<CollisionProbability>,
    #[serde(default)]
    pub safety_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollisionProbability {
    #[serde(default)]
    pub pc_2d: Option<f64>,
    #[serde(default)]
    pub pc_3d: Option<f64>,
    #[serde(default)]
    pub pc_mc: Option<f64>,
    #[serde(default)]
    pub mahalanobis_distance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManeuverSuggestion {
    pub event_with: String,
    #[serde(default)]
    pub tca: String,
    pub distance_km: f64,
    #[serde(default)]
    pub relative_speed_km_s: Option<f64>,
    #[serde(default)]
    pub action: ManeuverAction,
}

/// Latest space-weather conditions, global or for one satellite's location
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpaceWeatherSnapshot {
    #[serde(default)]
    pub kp_index: KpIndex,
    #[serde(default)]
    pub solar_flare: SolarFlare,
    #[serde(default)]
    pub solar_wind: SolarWind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proton_flux: Option<ProtonFlux>,
    #[serde(default)]
    pub threats: Vec<WeatherThreat>,
    #[serde(default)]
    pub overall_risk: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpIndex {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub risk: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolarFlare {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub data_points: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolarWind {
    #[serde(default)]
    pub speed_km_s: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProtonFlux {
    #[serde(default)]
    pub data_points: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherThreat {
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub recommendation: String,
}

/// Body of the legacy single-satellite `/analyze` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub user_tle: UserTle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: f64,
    #[serde(default = "default_threshold_km")]
    pub threshold_km: f64,
    #[serde(default = "default_max_catalog")]
    pub max_catalog: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTle {
    #[serde(default = "default_user_sat_name")]
    pub name: String,
    pub tle1: String,
    pub tle2: String,
}

fn default_window_hours() -> f64 {
    12.0
}

fn default_step_seconds() -> f64 {
    60.0
}

fn default_threshold_km() -> f64 {
    5.0
}

fn default_max_catalog() -> u32 {
    200
}

fn default_user_sat_name() -> String {
    "USER-SAT".to_string()
}
