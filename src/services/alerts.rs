/// Alert derivation rules
use crate::domain::backend::ConjunctionEvent;
use crate::domain::{Alert, AlertDetails, AlertKind, Severity, WeatherThreat};
use crate::utils::{now_rfc3339, slug, timestamp_id};
use rand::Rng;
use std::collections::VecDeque;

/// Conjunction events turned into alerts per satellite per analysis
pub const MAX_EVENTS_PER_SATELLITE: usize = 5;

/// Default number of alerts kept
pub const DEFAULT_ALERT_CAP: usize = 50;

/// Severity of a predicted close approach: under 1 km is critical, under
/// 3 km high, anything else medium.
pub fn conjunction_severity(distance_km: f64) -> Severity {
    if distance_km < 1.0 {
        Severity::Critical
    } else if distance_km < 3.0 {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Severity for a space-weather threat, or `None` when it should not alert.
/// Nominal conditions and LOW (or unrecognised) levels never alert.
pub fn threat_severity(threat: &WeatherThreat) -> Option<Severity> {
    if threat.kind.contains("Normal") || threat.kind.contains("Nominal") {
        return None;
    }
    Severity::from_level(&threat.level).filter(|s| *s >= Severity::Medium)
}

fn new_alert(
    source: &str,
    satellite: &str,
    kind: AlertKind,
    severity: Severity,
    message: String,
) -> Alert {
    Alert {
        id: format!("{}-{}", source, timestamp_id()),
        satellite: satellite.to_string(),
        kind,
        severity,
        message,
        timestamp: now_rfc3339(),
        distance_km: None,
        tca: None,
        probability: None,
        relative_speed_km_s: None,
        details: None,
        acknowledged: false,
    }
}

/// One alert per reported event, first few events only
pub fn conjunction_alerts(satellite: &str, events: &[ConjunctionEvent]) -> Vec<Alert> {
    events
        .iter()
        .take(MAX_EVENTS_PER_SATELLITE)
        .map(|ev| {
            let source = format!("conj-{}-{}", slug(satellite), slug(&ev.other_name));
            let mut alert = new_alert(
                &source,
                satellite,
                AlertKind::Conjunction,
                conjunction_severity(ev.min_distance_km),
                format!("Conjunction detected with {}", ev.other_name),
            );
            alert.distance_km = Some(ev.min_distance_km);
            alert.tca = ev.tca_utc.clone();
            alert.probability = ev.collision_probability.as_ref().and_then(|p| p.pc_2d);
            alert.relative_speed_km_s = ev.rel_speed_km_s;
            alert
        })
        .collect()
}

/// Alerts for the actionable threats of a satellite-local weather report
pub fn weather_alerts(satellite: &str, threats: &[WeatherThreat]) -> Vec<Alert> {
    threats
        .iter()
        .filter_map(|threat| {
            let severity = threat_severity(threat)?;
            let source = format!("wx-{}-{}", slug(satellite), slug(&threat.kind));
            Some(new_alert(
                &source,
                satellite,
                AlertKind::SpaceWeather,
                severity,
                format!("{}: {}", threat.kind, threat.impact),
            ))
        })
        .collect()
}

/// The single alert raised when fleet analysis answers 502
pub fn backend_unavailable_alert() -> Alert {
    new_alert(
        "backend-502",
        "System",
        AlertKind::System,
        Severity::Critical,
        "Analysis backend unavailable (HTTP 502); threat data may be stale".to_string(),
    )
}

pub fn system_alert(satellite: &str, message: impl Into<String>, severity: Severity) -> Alert {
    new_alert(
        "system",
        satellite,
        AlertKind::System,
        severity,
        message.into(),
    )
}

/// Fill the extended detail block of an alert if it has none yet.
///
/// Figures the source did not report get placeholder values in plausible
/// ranges. Existing details are never regenerated.
pub fn fill_details<'a, R: Rng>(alert: &'a mut Alert, rng: &mut R) -> &'a AlertDetails {
    let severity = alert.severity;
    let probability = alert.probability;
    let speed = alert.relative_speed_km_s;
    alert.details.get_or_insert_with(|| {
        let (action, impact) = match severity {
            Severity::Critical => (
                "Execute avoidance maneuver before TCA",
                "Loss of vehicle possible without action",
            ),
            Severity::High => (
                "Prepare maneuver plan and refine tracking",
                "Elevated collision risk",
            ),
            Severity::Medium => ("Continue monitoring", "Minor operational impact"),
            Severity::Low => ("No action required", "Negligible"),
        };
        AlertDetails {
            collision_probability: probability.unwrap_or_else(|| rng.gen_range(1e-6..1e-3)),
            relative_speed_km_s: speed.unwrap_or_else(|| rng.gen_range(7.0..15.0)),
            recommended_action: action.to_string(),
            confidence: rng.gen_range(0.85..0.99),
            estimated_impact: impact.to_string(),
        }
    })
}

/// Newest-first alert list with a fixed capacity
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    cap: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_cap(DEFAULT_ALERT_CAP)
    }
}

impl AlertLog {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap: cap.max(1),
        }
    }

    /// Prepend a batch, keeping its internal order, then drop the oldest
    /// entries beyond the cap
    pub fn push_batch(&mut self, batch: Vec<Alert>) {
        for alert in batch.into_iter().rev() {
            self.entries.push_front(alert);
        }
        self.entries.truncate(self.cap);
    }

    pub fn push(&mut self, alert: Alert) {
        self.push_batch(vec![alert]);
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Alert> {
        self.entries.iter_mut().find(|a| a.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::CollisionProbability;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn event(other: &str, distance: f64) -> ConjunctionEvent {
        ConjunctionEvent {
            other_name: other.to_string(),
            min_distance_km: distance,
            tca_utc: Some("2024-10-25T12:00:00+00:00".to_string()),
            ..Default::default()
        }
    }

    fn threat(kind: &str, level: &str) -> WeatherThreat {
        WeatherThreat {
            kind: kind.to_string(),
            level: level.to_string(),
            impact: "impact".to_string(),
            recommendation: "recommendation".to_string(),
        }
    }

    #[test]
    fn test_conjunction_severity_thresholds() {
        assert_eq!(conjunction_severity(0.5), Severity::Critical);
        assert_eq!(conjunction_severity(1.0), Severity::High);
        assert_eq!(conjunction_severity(2.5), Severity::High);
        assert_eq!(conjunction_severity(3.0), Severity::Medium);
        assert_eq!(conjunction_severity(4.0), Severity::Medium);
    }

    #[test]
    fn test_conjunction_alert_message_and_fields() {
        let alerts = conjunction_alerts("ISS", &[event("DEBRIS-1", 0.8)]);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.kind, AlertKind::Conjunction);
        assert_eq!(alert.message, "Conjunction detected with DEBRIS-1");
        assert_eq!(alert.satellite, "ISS");
        assert_eq!(alert.distance_km, Some(0.8));
        assert!(!alert.acknowledged);
    }

    #[test]
    fn test_conjunction_alerts_take_first_five() {
        let events: Vec<_> = (0..8).map(|i| event(&format!("OBJ-{}", i), 4.0)).collect();
        let alerts = conjunction_alerts("ISS", &events);
        assert_eq!(alerts.len(), MAX_EVENTS_PER_SATELLITE);
        assert_eq!(alerts[4].message, "Conjunction detected with OBJ-4");
    }

    #[test]
    fn test_conjunction_alert_ids_are_unique() {
        let events = vec![event("DEBRIS-1", 2.0), event("DEBRIS-1", 2.0)];
        let alerts = conjunction_alerts("ISS", &events);
        assert_ne!(alerts[0].id, alerts[1].id);
    }

    #[test]
    fn test_weather_alerts_skip_nominal_and_low() {
        let threats = vec![
            threat("Nominal Conditions", "HIGH"),
            threat("Normal Activity", "CRITICAL"),
            threat("Geomagnetic Activity", "LOW"),
            threat("Solar Flare", "CRITICAL"),
            threat("High Altitude Solar Wind", "MODERATE"),
        ];
        let alerts = weather_alerts("ISS", &threats);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].message, "Solar Flare: impact");
        assert_eq!(alerts[1].severity, Severity::Medium);
        assert!(alerts.iter().all(|a| a.kind == AlertKind::SpaceWeather));
    }

    #[test]
    fn test_backend_unavailable_alert_is_critical_system() {
        let alert = backend_unavailable_alert();
        assert_eq!(alert.kind, AlertKind::System);
        assert_eq!(alert.severity, Severity::Critical);
    }

    #[test]
    fn test_alert_log_prepends_and_caps() {
        let mut log = AlertLog::with_cap(50);
        for i in 0..60 {
            log.push(system_alert("ISS", format!("alert {}", i), Severity::Low));
            assert!(log.len() <= 50);
        }
        assert_eq!(log.len(), 50);
        let messages: Vec<_> = log.to_vec().into_iter().map(|a| a.message).collect();
        assert_eq!(messages[0], "alert 59");
        assert_eq!(messages[49], "alert 10");
    }

    #[test]
    fn test_alert_log_keeps_batch_order() {
        let mut log = AlertLog::default();
        log.push(system_alert("ISS", "old", Severity::Low));
        log.push_batch(vec![
            system_alert("ISS", "first", Severity::Low),
            system_alert("ISS", "second", Severity::Low),
        ]);
        let messages: Vec<_> = log.to_vec().into_iter().map(|a| a.message).collect();
        assert_eq!(messages, vec!["first", "second", "old"]);
    }

    #[test]
    fn test_fill_details_uses_source_figures() {
        let mut ev = event("DEBRIS-1", 0.4);
        ev.rel_speed_km_s = Some(12.5);
        ev.collision_probability = Some(CollisionProbability {
            pc_2d: Some(2e-4),
            ..Default::default()
        });
        let mut alert = conjunction_alerts("ISS", &[ev]).remove(0);
        let mut rng = StdRng::seed_from_u64(7);
        let details = fill_details(&mut alert, &mut rng).clone();
        assert_eq!(details.collision_probability, 2e-4);
        assert_eq!(details.relative_speed_km_s, 12.5);
        assert!(details.confidence >= 0.85 && details.confidence < 0.99);
    }

    #[test]
    fn test_fill_details_is_stable_once_filled() {
        let mut alert = conjunction_alerts("ISS", &[event("DEBRIS-1", 2.0)]).remove(0);
        let mut rng = StdRng::seed_from_u64(1);
        let first = fill_details(&mut alert, &mut rng).clone();
        let second = fill_details(&mut alert, &mut rng).clone();
        assert_eq!(first, second);
        assert!(first.relative_speed_km_s >= 7.0 && first.relative_speed_km_s < 15.0);
    }
}
