/// HTTP request handlers
use crate::domain::backend::AnalyzeRequest;
use crate::domain::{Alert, AlertDetails, Decision, Health, NewSatellite, Satellite, WeatherState};
use crate::errors::{ApiError, ApiResult};
use crate::scene::SceneSatellite;
use crate::services::DashboardService;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DashboardService>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

type JsonResult<T> = ApiResult<Json<SuccessResponse<T>>>;

fn ok<T: Serialize>(data: T) -> JsonResult<T> {
    Ok(Json(SuccessResponse::new(data)))
}

#[derive(Serialize)]
pub struct SatelliteList {
    pub satellites: Vec<Satellite>,
}

#[derive(Serialize)]
pub struct SatelliteAdded {
    pub satellite: Satellite,
}

#[derive(Serialize)]
pub struct Removed {
    pub removed: bool,
}

#[derive(Serialize)]
pub struct Selection {
    pub selected: Option<String>,
}

#[derive(Serialize)]
pub struct Scene {
    pub satellites: Vec<SceneSatellite>,
}

#[derive(Serialize)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
}

#[derive(Serialize)]
pub struct AlertView {
    pub alert: Alert,
}

#[derive(Serialize)]
pub struct DetailView {
    pub details: AlertDetails,
}

#[derive(Serialize)]
pub struct DecisionList {
    pub decisions: Vec<Decision>,
}

#[derive(Serialize)]
pub struct DecisionView {
    pub decision: Decision,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let backend = match state.service.backend_health().await {
        Ok(v) => v,
        Err(e) => serde_json::json!({ "status": "unreachable", "error": e.to_string() }),
    };
    Json(Health {
        status: "ok",
        now: Utc::now(),
        backend,
    })
}

pub async fn list_satellites(State(state): State<AppState>) -> JsonResult<SatelliteList> {
    ok(SatelliteList {
        satellites: state.service.satellites().await,
    })
}

pub async fn add_satellite(
    State(state): State<AppState>,
    Json(candidate): Json<NewSatellite>,
) -> JsonResult<SatelliteAdded> {
    let satellite = state.service.add_satellite(candidate).await?;
    ok(SatelliteAdded { satellite })
}

pub async fn load_samples(State(state): State<AppState>) -> JsonResult<SatelliteList> {
    ok(SatelliteList {
        satellites: state.service.load_samples().await,
    })
}

pub async fn remove_satellite(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<Removed> {
    ok(Removed {
        removed: state.service.remove_satellite(&id).await,
    })
}

/// Toggle selection of a satellite
pub async fn select_satellite(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<Selection> {
    let selected = state.service.select(&id).await?;
    ok(Selection { selected })
}

/// Roster as the visualization consumes it
pub async fn get_scene(State(state): State<AppState>) -> JsonResult<Scene> {
    ok(Scene {
        satellites: state.service.scene().to_vec(),
    })
}

pub async fn list_alerts(State(state): State<AppState>) -> JsonResult<AlertList> {
    ok(AlertList {
        alerts: state.service.alerts().await,
    })
}

pub async fn acknowledge_alert(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<AlertView> {
    let alert = state.service.acknowledge_alert(&id).await?;
    ok(AlertView { alert })
}

pub async fn alert_details(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<DetailView> {
    let details = state.service.alert_details(&id).await?;
    ok(DetailView { details })
}

pub async fn list_decisions(State(state): State<AppState>) -> JsonResult<DecisionList> {
    ok(DecisionList {
        decisions: state.service.decisions().await,
    })
}

pub async fn approve_decision(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<DecisionView> {
    let decision = state.service.approve(&id).await?;
    ok(DecisionView { decision })
}

pub async fn reject_decision(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<DecisionView> {
    let decision = state.service.reject(&id).await?;
    ok(DecisionView { decision })
}

pub async fn execute_decision(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<DecisionView> {
    let decision = state.service.execute(&id).await?;
    ok(DecisionView { decision })
}

/// Current weather, or the error that blocks the weather view
pub async fn get_space_weather(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let weather: WeatherState = state.service.weather_state().await;
    if let Some(error) = &weather.error {
        return Err(ApiError::Upstream {
            status: 503,
            message: format!("space weather unavailable: {}", error),
        });
    }
    if weather.snapshot.is_none() {
        return Ok(Json(serde_json::json!(SuccessResponse::new(
            serde_json::json!({ "message": "no data" })
        ))));
    }
    Ok(Json(serde_json::json!(SuccessResponse::new(weather))))
}

/// Manual retry of the weather fetch
pub async fn refresh_space_weather(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.service.refresh_weather().await?;
    get_space_weather(State(state)).await
}

/// Legacy single-satellite screening, passed through to the backend
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let analysis = state.service.analyze_single(&request).await?;
    Ok(Json(serde_json::json!(SuccessResponse::new(
        serde_json::json!({ "analysis": analysis })
    ))))
}
