/// Dashboard state store
use crate::domain::backend::{FleetAnalysisResponse, PositionsResponse, SatelliteRef};
use crate::domain::{
    Alert, AlertDetails, CollisionSummary, Decision, DecisionAction, NewSatellite, Satellite,
    SatelliteStatus, Severity, SpaceWeatherSnapshot, ThreatLevel, WeatherState,
};
use crate::errors::{ApiError, ApiResult};
use crate::services::alerts::{self, AlertLog};
use crate::services::decisions;
use crate::utils::{has_tle_prefix, timestamp_id};
use std::collections::HashMap;

pub const DEFAULT_COLOR: &str = "#00ff00";

/// Satellites offered by the "load sample" action
pub const SAMPLE_SATELLITES: &[(&str, &str, &str, &str)] = &[
    (
        "ISS (ZARYA)",
        "1 25544U 98067A   24298.50000000  .00016717  00000+0  10270-3 0  9005",
        "2 25544  51.6400 208.9163 0006317  69.9862 320.6634 15.50192628473224",
        "#00ff00",
    ),
    (
        "HUBBLE SPACE TELESCOPE",
        "1 20580U 90037B   24298.50000000  .00001390  00000+0  71139-4 0  9991",
        "2 20580  28.4697 259.1734 0002901 300.5682 151.9476 15.09742863334442",
        "#00aaff",
    ),
];

/// Roster, alerts, decisions and weather. All mutation goes through the
/// named operations below.
#[derive(Debug, Default)]
pub struct DashboardStore {
    satellites: Vec<Satellite>,
    selected: Option<String>,
    alerts: AlertLog,
    decisions: Vec<Decision>,
    weather: Option<SpaceWeatherSnapshot>,
    weather_scope: Option<String>,
    weather_error: Option<String>,
}

impl DashboardStore {
    pub fn new(alert_cap: usize) -> Self {
        Self {
            alerts: AlertLog::with_cap(alert_cap),
            ..Default::default()
        }
    }

    // --- roster -------------------------------------------------------

    /// Validate and append a satellite. Nothing changes on failure.
    pub fn add_satellite(&mut self, candidate: NewSatellite) -> ApiResult<Satellite> {
        let name = candidate.name.trim();
        let tle1 = candidate.tle1.trim();
        let tle2 = candidate.tle2.trim();

        if name.is_empty() || tle1.is_empty() || tle2.is_empty() {
            return Err(ApiError::InvalidInput(
                "name, tle1 and tle2 are required".to_string(),
            ));
        }
        if !has_tle_prefix(tle1, 1) || !has_tle_prefix(tle2, 2) {
            return Err(ApiError::InvalidInput(
                "tle1 must start with \"1 \" and tle2 with \"2 \"".to_string(),
            ));
        }

        let satellite = Satellite {
            id: self.fresh_satellite_id(),
            name: name.to_string(),
            tle1: tle1.to_string(),
            tle2: tle2.to_string(),
            color: candidate
                .color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            status: SatelliteStatus::Active,
            position: None,
            threat_level: None,
            collision: None,
        };

        self.satellites.push(satellite.clone());
        self.alerts.push(alerts::system_alert(
            &satellite.name,
            format!("Satellite {} added to tracking", satellite.name),
            Severity::Low,
        ));
        Ok(satellite)
    }

    fn fresh_satellite_id(&self) -> String {
        loop {
            let id = format!("sat-{}", timestamp_id());
            if !self.satellites.iter().any(|s| s.id == id) {
                return id;
            }
        }
    }

    /// Remove a satellite; returns whether anything was removed
    pub fn remove_satellite(&mut self, id: &str) -> bool {
        let before = self.satellites.len();
        self.satellites.retain(|s| s.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.satellites.len() != before
    }

    /// Add the sample satellites not already tracked under the same name
    pub fn load_samples(&mut self) -> Vec<Satellite> {
        let mut added = Vec::new();
        for (name, tle1, tle2, color) in SAMPLE_SATELLITES {
            if self.satellites.iter().any(|s| s.name == *name) {
                continue;
            }
            let candidate = NewSatellite {
                name: name.to_string(),
                tle1: tle1.to_string(),
                tle2: tle2.to_string(),
                color: Some(color.to_string()),
            };
            if let Ok(sat) = self.add_satellite(candidate) {
                added.push(sat);
            }
        }
        added
    }

    /// Toggle the selection. Returns the selected id afterwards.
    pub fn select(&mut self, id: &str) -> ApiResult<Option<String>> {
        if !self.satellites.iter().any(|s| s.id == id) {
            return Err(ApiError::NotFound(format!("satellite {}", id)));
        }
        self.selected = if self.selected.as_deref() == Some(id) {
            None
        } else {
            Some(id.to_string())
        };
        Ok(self.selected.clone())
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn satellite_refs(&self) -> Vec<SatelliteRef> {
        self.satellites.iter().map(SatelliteRef::from).collect()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_satellite(&self) -> Option<&Satellite> {
        let id = self.selected.as_deref()?;
        self.satellites.iter().find(|s| s.id == id)
    }

    // --- poll responses -------------------------------------------------

    /// Replace positions for roster entries with a usable result. Entries
    /// without one keep what they had.
    pub fn apply_positions(&mut self, response: &PositionsResponse) -> usize {
        let by_id: HashMap<&str, _> = response
            .positions
            .iter()
            .filter(|r| r.error.is_none())
            .filter_map(|r| r.position.as_ref().map(|p| (r.id.as_str(), p)))
            .collect();

        let mut updated = 0;
        for sat in &mut self.satellites {
            if let Some(position) = by_id.get(sat.id.as_str()) {
                sat.position = Some((*position).clone());
                updated += 1;
            }
        }
        updated
    }

    /// Record threat levels and derive alerts and decisions from a fleet
    /// analysis. Entries carrying an error are skipped. Returns
    /// `(alerts added, decisions added)`.
    pub fn apply_fleet_analysis(&mut self, response: &FleetAnalysisResponse) -> (usize, usize) {
        let mut new_alerts = Vec::new();
        let mut new_decisions = Vec::new();

        for result in &response.satellites {
            // a satellite the backend failed to screen keeps its last assessment
            if result.error.is_some() {
                continue;
            }
            let Some(sat) = self
                .satellites
                .iter_mut()
                .find(|s| s.id == result.satellite_id)
            else {
                continue;
            };

            sat.threat_level = Some(result.threat_level);
            sat.status = result.threat_level.status();
            if let Some(summary) = closest_collision_summary(result) {
                sat.collision = Some(summary);
            }

            let name = sat.name.clone();
            new_alerts.extend(alerts::conjunction_alerts(&name, &result.events));
            new_decisions.extend(decisions::conjunction_decisions(
                &result.satellite_id,
                &name,
                &result.suggestions,
            ));
        }

        let alert_count = new_alerts.len();
        self.alerts.push_batch(new_alerts);
        let decision_count = decisions::merge_new(&mut self.decisions, new_decisions);
        (alert_count, decision_count)
    }

    /// Fleet analysis answered 502: one critical alert, nothing else
    pub fn apply_backend_unavailable(&mut self) {
        self.alerts.push(alerts::backend_unavailable_alert());
    }

    /// Global weather snapshot, replaced wholesale
    pub fn set_weather(&mut self, snapshot: SpaceWeatherSnapshot) {
        self.weather = Some(snapshot);
        self.weather_scope = None;
        self.weather_error = None;
    }

    /// Weather at one satellite's location. Its actionable threats become
    /// alerts and mitigation decisions for that satellite.
    pub fn apply_local_weather(
        &mut self,
        satellite_id: &str,
        snapshot: SpaceWeatherSnapshot,
    ) -> (usize, usize) {
        let Some(sat) = self.satellites.iter().find(|s| s.id == satellite_id) else {
            return (0, 0);
        };
        let name = sat.name.clone();

        let new_alerts = alerts::weather_alerts(&name, &snapshot.threats);
        let new_decisions = decisions::mitigation_decisions(satellite_id, &name, &snapshot.threats);

        self.weather = Some(snapshot);
        self.weather_scope = Some(satellite_id.to_string());
        self.weather_error = None;

        let alert_count = new_alerts.len();
        self.alerts.push_batch(new_alerts);
        let decision_count = decisions::merge_new(&mut self.decisions, new_decisions);
        (alert_count, decision_count)
    }

    /// Primary weather fetch failed; the previous snapshot is kept
    pub fn set_weather_error(&mut self, message: String) {
        self.weather_error = Some(message);
    }

    pub fn weather_state(&self) -> WeatherState {
        WeatherState {
            snapshot: self.weather.clone(),
            error: self.weather_error.clone(),
            scope: self.weather_scope.clone(),
        }
    }

    // --- alerts ---------------------------------------------------------

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.to_vec()
    }

    #[cfg(test)]
    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn acknowledge_alert(&mut self, id: &str) -> ApiResult<Alert> {
        let alert = self
            .alerts
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("alert {}", id)))?;
        alert.acknowledged = true;
        Ok(alert.clone())
    }

    /// Detail view of an alert, filled on first access
    pub fn alert_details(&mut self, id: &str) -> ApiResult<AlertDetails> {
        let alert = self
            .alerts
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("alert {}", id)))?;
        let details = alerts::fill_details(alert, &mut rand::thread_rng());
        Ok(details.clone())
    }

    // --- decisions ------------------------------------------------------

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    fn decision_mut(&mut self, id: &str) -> ApiResult<&mut Decision> {
        self.decisions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("decision {}", id)))
    }

    /// Approve a pending decision. Approval also stands the whole fleet
    /// down to active/LOW, regardless of which satellite it concerned.
    pub fn approve(&mut self, id: &str) -> ApiResult<Decision> {
        let decision = self.decision_mut(id)?;
        decision.advance(DecisionAction::Approve)?;
        let decision = decision.clone();

        for sat in &mut self.satellites {
            sat.status = SatelliteStatus::Active;
            sat.threat_level = Some(ThreatLevel::Low);
        }
        self.alerts.push(alerts::system_alert(
            "Fleet",
            "All satellites operational",
            Severity::Low,
        ));
        Ok(decision)
    }

    pub fn reject(&mut self, id: &str) -> ApiResult<Decision> {
        let decision = self.decision_mut(id)?;
        decision.advance(DecisionAction::Reject)?;
        Ok(decision.clone())
    }

    /// approved → executing
    pub fn begin_execution(&mut self, id: &str) -> ApiResult<Decision> {
        let decision = self.decision_mut(id)?;
        decision.advance(DecisionAction::Execute)?;
        Ok(decision.clone())
    }

    /// executing → completed, with the completion alert. `None` when the
    /// decision is gone or no longer executing.
    pub fn complete_execution(&mut self, id: &str) -> Option<Decision> {
        let decision = self.decisions.iter_mut().find(|d| d.id == id)?;
        decision.advance(DecisionAction::Complete).ok()?;
        let decision = decision.clone();
        self.alerts.push(alerts::system_alert(
            &decision.satellite,
            "Maneuver executed successfully",
            Severity::Low,
        ));
        Some(decision)
    }
}

/// Collision summary of the closest event that carries probability figures
fn closest_collision_summary(
    result: &crate::domain::backend::SatelliteAnalysis,
) -> Option<CollisionSummary> {
    result
        .events
        .iter()
        .filter(|e| e.collision_probability.is_some() || e.safety_level.is_some())
        .min_by(|a, b| a.min_distance_km.total_cmp(&b.min_distance_km))
        .map(|e| {
            let pc = e.collision_probability.clone().unwrap_or_default();
            CollisionSummary {
                pc_2d: pc.pc_2d,
                pc_3d: pc.pc_3d,
                pc_mc: pc.pc_mc,
                mahalanobis_distance: pc.mahalanobis_distance,
                safety_level: e.safety_level.clone(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::{
        CollisionProbability, ConjunctionEvent, ManeuverSuggestion, PositionResult,
        SatelliteAnalysis,
    };
    use crate::domain::{AlertKind, DecisionStatus, Position, WeatherThreat};
    use std::collections::HashSet;

    const ISS_TLE1: &str = "1 25544U 98067A   24298.50000000  .00016717  00000+0  10270-3 0  9005";
    const ISS_TLE2: &str = "2 25544  51.6400 208.9163 0006317  69.9862 320.6634 15.50192628473224";

    fn candidate(name: &str) -> NewSatellite {
        NewSatellite {
            name: name.to_string(),
            tle1: ISS_TLE1.to_string(),
            tle2: ISS_TLE2.to_string(),
            color: None,
        }
    }

    fn position(lat: f64) -> Position {
        Position {
            lat,
            lon: 0.0,
            alt: 420.0,
            x: 0.0,
            y: 0.0,
            z: 6791.0,
            vx: None,
            vy: None,
            vz: None,
        }
    }

    fn analysis_for(sat_id: &str, distance: f64, other: &str) -> FleetAnalysisResponse {
        FleetAnalysisResponse {
            satellites: vec![SatelliteAnalysis {
                satellite_id: sat_id.to_string(),
                satellite_name: Some("ISS".to_string()),
                threat_level: ThreatLevel::Critical,
                events: vec![ConjunctionEvent {
                    other_name: other.to_string(),
                    min_distance_km: distance,
                    tca_utc: Some("2024-10-25T12:00:00+00:00".to_string()),
                    rel_speed_km_s: Some(9.5),
                    collision_probability: Some(CollisionProbability {
                        pc_2d: Some(3e-4),
                        mahalanobis_distance: Some(1.2),
                        ..Default::default()
                    }),
                    safety_level: Some("CRITICAL".to_string()),
                }],
                suggestions: vec![ManeuverSuggestion {
                    event_with: other.to_string(),
                    tca: "2024-10-25T12:00:00+00:00".to_string(),
                    distance_km: distance,
                    relative_speed_km_s: Some(9.5),
                    action: Default::default(),
                }],
                error: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_add_satellite_assigns_id_and_alerts() {
        let mut store = DashboardStore::new(50);
        let sat = store.add_satellite(candidate("ISS")).unwrap();
        assert!(sat.id.starts_with("sat-"));
        assert_eq!(sat.status, SatelliteStatus::Active);
        assert_eq!(sat.color, DEFAULT_COLOR);
        assert_eq!(store.satellites().len(), 1);

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::System);
        assert_eq!(alerts[0].severity, Severity::Low);
    }

    #[test]
    fn test_add_satellite_rejects_swapped_lines() {
        let mut store = DashboardStore::new(50);
        let bad = NewSatellite {
            name: "X".to_string(),
            tle1: "2 bad".to_string(),
            tle2: "1 bad".to_string(),
            color: None,
        };
        let err = store.add_satellite(bad).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(store.is_empty());
        assert_eq!(store.alert_count(), 0);
    }

    #[test]
    fn test_add_satellite_rejects_missing_fields() {
        let mut store = DashboardStore::new(50);
        let mut c = candidate("  ");
        assert!(store.add_satellite(c.clone()).is_err());
        c.name = "ISS".to_string();
        c.tle2 = String::new();
        assert!(store.add_satellite(c).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_stay_unique_across_add_and_remove() {
        let mut store = DashboardStore::new(50);
        let mut ids = Vec::new();
        for i in 0..20 {
            let sat = store.add_satellite(candidate(&format!("SAT-{}", i))).unwrap();
            ids.push(sat.id);
            if i % 3 == 0 {
                let victim = ids.remove(0);
                assert!(store.remove_satellite(&victim));
            }
        }
        let unique: HashSet<_> = store.satellites().iter().map(|s| s.id.clone()).collect();
        assert_eq!(unique.len(), store.satellites().len());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = DashboardStore::new(50);
        store.add_satellite(candidate("ISS")).unwrap();
        assert!(!store.remove_satellite("nope"));
        assert_eq!(store.satellites().len(), 1);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut store = DashboardStore::new(50);
        let sat = store.add_satellite(candidate("ISS")).unwrap();
        store.select(&sat.id).unwrap();
        store.remove_satellite(&sat.id);
        assert!(store.selected_id().is_none());
    }

    #[test]
    fn test_select_toggles_single_selection() {
        let mut store = DashboardStore::new(50);
        let a = store.add_satellite(candidate("A")).unwrap();
        let b = store.add_satellite(candidate("B")).unwrap();
        assert_eq!(store.select(&a.id).unwrap(), Some(a.id.clone()));
        assert_eq!(store.select(&b.id).unwrap(), Some(b.id.clone()));
        assert_eq!(store.select(&b.id).unwrap(), None);
        assert!(store.select("missing").is_err());
    }

    #[test]
    fn test_load_samples_skips_existing_names() {
        let mut store = DashboardStore::new(50);
        assert_eq!(store.load_samples().len(), SAMPLE_SATELLITES.len());
        assert!(store.load_samples().is_empty());
        assert_eq!(store.satellites().len(), SAMPLE_SATELLITES.len());
    }

    #[test]
    fn test_positions_only_touch_matching_entries() {
        let mut store = DashboardStore::new(50);
        let a = store.add_satellite(candidate("A")).unwrap();
        let b = store.add_satellite(candidate("B")).unwrap();

        store.apply_positions(&PositionsResponse {
            positions: vec![
                PositionResult {
                    id: a.id.clone(),
                    position: Some(position(1.0)),
                    ..Default::default()
                },
                PositionResult {
                    id: b.id.clone(),
                    position: Some(position(2.0)),
                    ..Default::default()
                },
            ],
        });

        // second poll: A failed, B missing entirely
        let updated = store.apply_positions(&PositionsResponse {
            positions: vec![PositionResult {
                id: a.id.clone(),
                error: Some("propagation failed".to_string()),
                ..Default::default()
            }],
        });

        assert_eq!(updated, 0);
        let sats = store.satellites();
        assert_eq!(sats[0].position.as_ref().map(|p| p.lat), Some(1.0));
        assert_eq!(sats[1].position.as_ref().map(|p| p.lat), Some(2.0));
    }

    #[test]
    fn test_fleet_analysis_scenario_single_critical_alert() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        let before = store.alert_count();

        let (alerts_added, decisions_added) =
            store.apply_fleet_analysis(&analysis_for(&iss.id, 0.8, "DEBRIS-1"));

        assert_eq!(alerts_added, 1);
        assert_eq!(decisions_added, 1);
        assert_eq!(store.alert_count(), before + 1);
        let newest = &store.alerts()[0];
        assert_eq!(newest.severity, Severity::Critical);
        assert_eq!(newest.message, "Conjunction detected with DEBRIS-1");

        let sat = &store.satellites()[0];
        assert_eq!(sat.threat_level, Some(ThreatLevel::Critical));
        assert_eq!(sat.status, SatelliteStatus::Critical);
        assert_eq!(sat.collision.as_ref().and_then(|c| c.pc_2d), Some(3e-4));
    }

    #[test]
    fn test_failed_screening_keeps_previous_assessment() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        store.apply_fleet_analysis(&analysis_for(&iss.id, 0.5, "DEBRIS-1"));
        let alerts_before = store.alert_count();

        let failed = FleetAnalysisResponse {
            satellites: vec![SatelliteAnalysis {
                satellite_id: iss.id.clone(),
                satellite_name: Some("ISS".to_string()),
                threat_level: ThreatLevel::Unknown,
                error: Some("Invalid TLE".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(store.apply_fleet_analysis(&failed), (0, 0));

        let sat = &store.satellites()[0];
        assert_eq!(sat.threat_level, Some(ThreatLevel::Critical));
        assert_eq!(sat.status, SatelliteStatus::Critical);
        assert!(sat.collision.is_some());
        assert_eq!(store.alert_count(), alerts_before);
    }

    #[test]
    fn test_repeat_analysis_does_not_duplicate_decisions() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        let resp = analysis_for(&iss.id, 0.8, "DEBRIS-1");

        store.apply_fleet_analysis(&resp);
        let id = store.decisions()[0].id.clone();
        store.reject(&id).unwrap();

        let (_, added) = store.apply_fleet_analysis(&resp);
        assert_eq!(added, 0);
        assert_eq!(store.decisions().len(), 1);
        assert_eq!(store.decisions()[0].status, DecisionStatus::Rejected);
    }

    #[test]
    fn test_analysis_for_unknown_satellite_is_ignored() {
        let mut store = DashboardStore::new(50);
        store.add_satellite(candidate("ISS")).unwrap();
        let before = store.alert_count();
        let (alerts_added, decisions_added) =
            store.apply_fleet_analysis(&analysis_for("removed-sat", 0.5, "DEBRIS-1"));
        assert_eq!((alerts_added, decisions_added), (0, 0));
        assert_eq!(store.alert_count(), before);
    }

    #[test]
    fn test_alert_cap_holds_across_derivations() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        for i in 0..40 {
            store.apply_fleet_analysis(&analysis_for(&iss.id, 2.0, &format!("OBJ-{}", i)));
            store.apply_backend_unavailable();
            assert!(store.alert_count() <= 50);
        }
        assert_eq!(store.alert_count(), 50);
    }

    #[test]
    fn test_approve_resets_fleet_and_alerts() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        store.add_satellite(candidate("HST")).unwrap();
        store.apply_fleet_analysis(&analysis_for(&iss.id, 0.5, "DEBRIS-1"));
        let id = store.decisions()[0].id.clone();

        let decision = store.approve(&id).unwrap();
        assert_eq!(decision.status, DecisionStatus::Approved);
        for sat in store.satellites() {
            assert_eq!(sat.status, SatelliteStatus::Active);
            assert_eq!(sat.threat_level, Some(ThreatLevel::Low));
        }
        let newest = &store.alerts()[0];
        assert_eq!(newest.severity, Severity::Low);
        assert_eq!(newest.message, "All satellites operational");
    }

    #[test]
    fn test_approve_twice_fails_without_side_effects() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        store.apply_fleet_analysis(&analysis_for(&iss.id, 0.5, "DEBRIS-1"));
        let id = store.decisions()[0].id.clone();
        store.approve(&id).unwrap();
        let count = store.alert_count();
        assert!(matches!(
            store.approve(&id),
            Err(ApiError::InvalidTransition { .. })
        ));
        assert_eq!(store.alert_count(), count);
    }

    #[test]
    fn test_execution_completes_once_with_alert() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        store.apply_fleet_analysis(&analysis_for(&iss.id, 0.5, "DEBRIS-1"));
        let id = store.decisions()[0].id.clone();

        assert!(store.begin_execution(&id).is_err());
        store.approve(&id).unwrap();
        assert_eq!(
            store.begin_execution(&id).unwrap().status,
            DecisionStatus::Executing
        );

        let count = store.alert_count();
        let done = store.complete_execution(&id).unwrap();
        assert_eq!(done.status, DecisionStatus::Completed);
        assert_eq!(store.alert_count(), count + 1);
        assert_eq!(store.alerts()[0].message, "Maneuver executed successfully");
        assert_eq!(store.alerts()[0].satellite, "ISS");

        assert!(store.complete_execution(&id).is_none());
        assert_eq!(store.alert_count(), count + 1);
    }

    #[test]
    fn test_local_weather_derives_alerts_and_mitigations() {
        let mut store = DashboardStore::new(50);
        let iss = store.add_satellite(candidate("ISS")).unwrap();
        let before = store.alert_count();
        let snapshot = SpaceWeatherSnapshot {
            threats: vec![
                WeatherThreat {
                    kind: "Nominal Conditions".to_string(),
                    level: "LOW".to_string(),
                    ..Default::default()
                },
                WeatherThreat {
                    kind: "Polar Region Geomagnetic Activity".to_string(),
                    level: "HIGH".to_string(),
                    impact: "Enhanced radiation exposure".to_string(),
                    recommendation: "Monitor radiation levels".to_string(),
                },
            ],
            ..Default::default()
        };

        let (a, d) = store.apply_local_weather(&iss.id, snapshot.clone());
        assert_eq!((a, d), (1, 1));
        assert_eq!(store.alert_count(), before + 1);
        assert_eq!(
            store.alerts()[0].message,
            "Polar Region Geomagnetic Activity: Enhanced radiation exposure"
        );
        assert_eq!(store.weather_state().scope.as_deref(), Some(iss.id.as_str()));

        // same threat on the next poll: new alert, no duplicate decision
        let (_, d) = store.apply_local_weather(&iss.id, snapshot);
        assert_eq!(d, 0);
        assert_eq!(store.decisions().len(), 1);
    }

    #[test]
    fn test_weather_error_keeps_snapshot() {
        let mut store = DashboardStore::new(50);
        store.set_weather(SpaceWeatherSnapshot {
            overall_risk: "LOW".to_string(),
            ..Default::default()
        });
        store.set_weather_error("timeout".to_string());
        let state = store.weather_state();
        assert!(state.snapshot.is_some());
        assert_eq!(state.error.as_deref(), Some("timeout"));

        store.set_weather(SpaceWeatherSnapshot::default());
        assert!(store.weather_state().error.is_none());
    }

    #[test]
    fn test_alert_ack_and_details() {
        let mut store = DashboardStore::new(50);
        store.add_satellite(candidate("ISS")).unwrap();
        let id = store.alerts()[0].id.clone();

        assert!(store.acknowledge_alert(&id).unwrap().acknowledged);
        let first = store.alert_details(&id).unwrap();
        let second = store.alert_details(&id).unwrap();
        assert_eq!(first, second);
        assert!(store.alert_details("missing").is_err());
    }
}
