/// Dashboard service: backend calls in, store operations out
pub mod alerts;
pub mod decisions;

use crate::clients::MissionBackend;
use crate::config::AnalysisParams;
use crate::domain::backend::{AnalyzeRequest, FleetAnalysisRequest, SatelliteRef};
use crate::domain::{Alert, AlertDetails, Decision, NewSatellite, Satellite, WeatherState};
use crate::errors::{ApiError, ApiResult};
use crate::scene::{self, SceneFeed, SceneSnapshot};
use crate::store::DashboardStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Request sequencing for one polling task. A response is applied only if
/// no newer response from the same task has been applied already.
#[derive(Default)]
pub struct TaskSequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl TaskSequence {
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claim `seq` as the newest applied response
    pub fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::SeqCst) < seq
    }
}

#[derive(Clone, Debug)]
pub struct ServiceSettings {
    pub analysis: AnalysisParams,
    pub execute_delay: Duration,
    pub alert_cap: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            analysis: AnalysisParams::default(),
            execute_delay: Duration::from_secs(3),
            alert_cap: alerts::DEFAULT_ALERT_CAP,
        }
    }
}

pub struct DashboardService {
    backend: Arc<dyn MissionBackend>,
    store: RwLock<DashboardStore>,
    scene: SceneFeed,
    settings: ServiceSettings,
    mounted: AtomicBool,
    weather_seq: TaskSequence,
    positions_seq: TaskSequence,
    analysis_seq: TaskSequence,
    executions: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn MissionBackend>, settings: ServiceSettings) -> Self {
        Self {
            backend,
            store: RwLock::new(DashboardStore::new(settings.alert_cap)),
            scene: SceneFeed::new(),
            settings,
            mounted: AtomicBool::new(true),
            weather_seq: TaskSequence::default(),
            positions_seq: TaskSequence::default(),
            analysis_seq: TaskSequence::default(),
            executions: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Stop accepting async results and cancel pending executions
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        if let Ok(mut executions) = self.executions.lock() {
            for (id, handle) in executions.drain() {
                debug!("Cancelling execution timer for {}", id);
                handle.abort();
            }
        }
        info!("Dashboard unmounted");
    }

    fn publish(&self, store: &DashboardStore) {
        self.scene
            .publish(scene::snapshot(store.satellites(), store.selected_id()));
    }

    // --- roster -------------------------------------------------------

    pub async fn add_satellite(&self, candidate: NewSatellite) -> ApiResult<Satellite> {
        let mut store = self.store.write().await;
        let sat = store.add_satellite(candidate)?;
        info!("Tracking satellite {} ({})", sat.name, sat.id);
        self.publish(&store);
        Ok(sat)
    }

    pub async fn remove_satellite(&self, id: &str) -> bool {
        let mut store = self.store.write().await;
        let removed = store.remove_satellite(id);
        if removed {
            info!("Stopped tracking satellite {}", id);
            self.publish(&store);
        }
        removed
    }

    pub async fn load_samples(&self) -> Vec<Satellite> {
        let mut store = self.store.write().await;
        let added = store.load_samples();
        if !added.is_empty() {
            self.publish(&store);
        }
        added
    }

    /// Toggle selection; a new selection fetches its local weather right away
    pub async fn select(self: &Arc<Self>, id: &str) -> ApiResult<Option<String>> {
        let selected = {
            let mut store = self.store.write().await;
            let selected = store.select(id)?;
            self.publish(&store);
            selected
        };

        if selected.is_some() {
            let service = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = service.refresh_weather().await {
                    error!("Selected satellite weather fetch error: {:?}", e);
                }
            });
        }
        Ok(selected)
    }

    pub async fn satellites(&self) -> Vec<Satellite> {
        self.store.read().await.satellites().to_vec()
    }

    // --- polling --------------------------------------------------------

    /// Global weather, or the selected satellite's local weather. Only a
    /// failed global fetch is recorded as the blocking weather error; a
    /// failed local fetch is logged and the current snapshot kept.
    pub async fn refresh_weather(&self) -> ApiResult<()> {
        let seq = self.weather_seq.next();
        let target = {
            let store = self.store.read().await;
            store.selected_satellite().map(SatelliteRef::from)
        };

        let result = match &target {
            Some(sat) => self.fetch_local_weather(sat).await,
            None => self.backend.space_weather().await,
        };

        if !self.is_mounted() {
            debug!("Discarding space weather response after unmount");
            return Ok(());
        }

        let mut store = self.store.write().await;
        if !self.weather_seq.try_apply(seq) {
            warn!("Discarding stale space weather response #{}", seq);
            return Ok(());
        }
        match result {
            Ok(snapshot) => {
                match &target {
                    Some(sat) => {
                        let (a, d) = store.apply_local_weather(&sat.id, snapshot);
                        if a > 0 || d > 0 {
                            info!(
                                "Space weather for {}: {} alerts, {} new decisions",
                                sat.name, a, d
                            );
                        }
                    }
                    None => store.set_weather(snapshot),
                }
                Ok(())
            }
            Err(e) => match &target {
                Some(sat) => {
                    warn!("Local space weather for {} unavailable: {}", sat.name, e);
                    Ok(())
                }
                None => {
                    store.set_weather_error(e.to_string());
                    Err(e)
                }
            },
        }
    }

    async fn fetch_local_weather(
        &self,
        sat: &SatelliteRef,
    ) -> ApiResult<crate::domain::SpaceWeatherSnapshot> {
        let resp = self.backend.positions(std::slice::from_ref(sat)).await?;
        resp.positions
            .into_iter()
            .find(|p| p.id == sat.id)
            .and_then(|p| p.space_weather)
            .ok_or_else(|| ApiError::Internal(format!("no space weather reported for {}", sat.name)))
    }

    /// Returns `false` without calling the backend when the roster is empty
    pub async fn refresh_positions(&self) -> ApiResult<bool> {
        let roster = self.store.read().await.satellite_refs();
        if roster.is_empty() {
            return Ok(false);
        }

        let seq = self.positions_seq.next();
        let resp = self.backend.positions(&roster).await?;

        if !self.is_mounted() {
            debug!("Discarding positions response after unmount");
            return Ok(true);
        }

        let mut store = self.store.write().await;
        if !self.positions_seq.try_apply(seq) {
            warn!("Discarding stale positions response #{}", seq);
            return Ok(true);
        }
        let updated = store.apply_positions(&resp);
        debug!("Updated {} of {} positions", updated, roster.len());
        self.publish(&store);
        Ok(true)
    }

    /// Returns `false` without calling the backend when the roster is empty.
    /// A 502 raises the backend-unavailable alert and is returned as an error.
    pub async fn refresh_analysis(&self) -> ApiResult<bool> {
        let roster = self.store.read().await.satellite_refs();
        if roster.is_empty() {
            return Ok(false);
        }

        let seq = self.analysis_seq.next();
        let params = &self.settings.analysis;
        let request = FleetAnalysisRequest {
            satellites: &roster,
            window_hours: params.window_hours,
            step_seconds: params.step_seconds,
            threshold_km: params.threshold_km,
            max_catalog: params.max_catalog,
        };
        let result = self.backend.analyze_fleet(&request).await;

        if !self.is_mounted() {
            debug!("Discarding fleet analysis response after unmount");
            return Ok(true);
        }

        let mut store = self.store.write().await;
        if !self.analysis_seq.try_apply(seq) {
            warn!("Discarding stale fleet analysis response #{}", seq);
            return Ok(true);
        }
        match result {
            Ok(resp) => {
                for failed in resp.satellites.iter().filter(|r| r.error.is_some()) {
                    warn!(
                        "Fleet analysis failed for {}: {}",
                        failed.satellite_name.as_deref().unwrap_or(&failed.satellite_id),
                        failed.error.as_deref().unwrap_or_default()
                    );
                }
                let (a, d) = store.apply_fleet_analysis(&resp);
                info!(
                    "Fleet analysis: {} satellites against {} catalog objects, {} alerts, {} new decisions",
                    resp.satellites.len(),
                    resp.meta.as_ref().map_or(0, |m| m.catalog_size),
                    a,
                    d
                );
                self.publish(&store);
                Ok(true)
            }
            Err(ApiError::BackendUnavailable(msg)) => {
                store.apply_backend_unavailable();
                Err(ApiError::BackendUnavailable(msg))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn weather_state(&self) -> WeatherState {
        self.store.read().await.weather_state()
    }

    // --- alerts ---------------------------------------------------------

    pub async fn alerts(&self) -> Vec<Alert> {
        self.store.read().await.alerts()
    }

    pub async fn acknowledge_alert(&self, id: &str) -> ApiResult<Alert> {
        self.store.write().await.acknowledge_alert(id)
    }

    pub async fn alert_details(&self, id: &str) -> ApiResult<AlertDetails> {
        self.store.write().await.alert_details(id)
    }

    // --- decisions ------------------------------------------------------

    pub async fn decisions(&self) -> Vec<Decision> {
        self.store.read().await.decisions().to_vec()
    }

    pub async fn approve(&self, id: &str) -> ApiResult<Decision> {
        let mut store = self.store.write().await;
        let decision = store.approve(id)?;
        info!("Decision {} approved for {}", decision.id, decision.satellite);
        self.publish(&store);
        Ok(decision)
    }

    pub async fn reject(&self, id: &str) -> ApiResult<Decision> {
        let decision = self.store.write().await.reject(id)?;
        info!("Decision {} rejected", decision.id);
        Ok(decision)
    }

    /// Start a simulated execution. The decision is `executing` on return
    /// and completes after the configured delay.
    pub async fn execute(self: &Arc<Self>, id: &str) -> ApiResult<Decision> {
        let decision = self.store.write().await.begin_execution(id)?;
        info!(
            "Executing decision {} for {} (completes in {:?})",
            decision.id, decision.satellite, self.settings.execute_delay
        );

        // Insert under the lock; the timer removes its own entry when it fires
        let mut executions = self
            .executions
            .lock()
            .map_err(|_| ApiError::Internal("execution registry poisoned".to_string()))?;
        let service = Arc::clone(self);
        let decision_id = decision.id.clone();
        let delay = self.settings.execute_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.finish_execution(&decision_id).await;
        });
        if let Some(previous) = executions.insert(decision.id.clone(), handle) {
            previous.abort();
        }
        Ok(decision)
    }

    async fn finish_execution(&self, id: &str) {
        if let Ok(mut executions) = self.executions.lock() {
            executions.remove(id);
        }
        if !self.is_mounted() {
            return;
        }
        match self.store.write().await.complete_execution(id) {
            Some(decision) => info!("Maneuver {} completed for {}", id, decision.satellite),
            None => warn!("Execution timer fired for {} but it is no longer executing", id),
        }
    }

    // --- visualization & passthroughs --------------------------------------

    pub fn scene(&self) -> SceneSnapshot {
        self.scene.current()
    }

    pub fn subscribe_scene(&self) -> watch::Receiver<SceneSnapshot> {
        self.scene.subscribe()
    }

    pub async fn analyze_single(&self, request: &AnalyzeRequest) -> ApiResult<Value> {
        self.backend.analyze(request).await
    }

    pub async fn backend_health(&self) -> ApiResult<Value> {
        self.backend.health().await
    }
}
