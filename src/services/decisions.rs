/// Decision derivation and the decision workflow
use crate::domain::backend::ManeuverSuggestion;
use crate::domain::{Decision, DecisionAction, DecisionStatus, Suggestion, WeatherThreat};
use crate::errors::{ApiError, ApiResult};
use crate::services::alerts::threat_severity;
use crate::utils::{now_rfc3339, slug};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;

impl DecisionStatus {
    /// Status reached by applying `action`, or an error if the workflow
    /// does not allow it from here
    pub fn apply(self, action: DecisionAction) -> ApiResult<DecisionStatus> {
        use DecisionAction::*;
        use DecisionStatus::*;

        match (self, action) {
            (Pending, Approve) => Ok(Approved),
            (Pending, Reject) => Ok(Rejected),
            (Approved, Execute) => Ok(Executing),
            (Executing, Complete) => Ok(Completed),
            (from, action) => Err(ApiError::InvalidTransition { from, action }),
        }
    }
}

impl Decision {
    /// Move this decision through the workflow; leaves it untouched on error
    pub fn advance(&mut self, action: DecisionAction) -> ApiResult<()> {
        self.status = self.status.apply(action)?;
        self.updated_at = now_rfc3339();
        Ok(())
    }
}

/// Id of a conjunction decision: the same suggestion polled again maps to
/// the same id
pub fn conjunction_decision_id(satellite_id: &str, suggestion: &ManeuverSuggestion) -> String {
    format!(
        "{}-{}-{}",
        satellite_id,
        slug(&suggestion.event_with),
        suggestion.tca
    )
}

/// Id of a weather-mitigation decision: one per satellite, threat type and
/// UTC day
pub fn mitigation_decision_id(satellite_id: &str, threat: &WeatherThreat, day: NaiveDate) -> String {
    format!("{}-{}-{}", satellite_id, slug(&threat.kind), day)
}

fn pending(id: String, satellite_id: &str, satellite: &str, suggestion: Suggestion) -> Decision {
    let now = now_rfc3339();
    Decision {
        id,
        satellite: satellite.to_string(),
        satellite_id: satellite_id.to_string(),
        suggestion,
        status: DecisionStatus::Pending,
        created_at: now.clone(),
        updated_at: now,
    }
}

pub fn conjunction_decisions(
    satellite_id: &str,
    satellite: &str,
    suggestions: &[ManeuverSuggestion],
) -> Vec<Decision> {
    suggestions
        .iter()
        .map(|s| {
            pending(
                conjunction_decision_id(satellite_id, s),
                satellite_id,
                satellite,
                Suggestion::Conjunction {
                    event_with: s.event_with.clone(),
                    tca: s.tca.clone(),
                    distance_km: s.distance_km,
                    relative_speed_km_s: s.relative_speed_km_s,
                    action: s.action.clone(),
                },
            )
        })
        .collect()
}

/// Mitigation decisions for the threats that would also raise an alert
pub fn mitigation_decisions(
    satellite_id: &str,
    satellite: &str,
    threats: &[WeatherThreat],
) -> Vec<Decision> {
    let today = Utc::now().date_naive();
    threats
        .iter()
        .filter_map(|t| {
            let priority = threat_severity(t)?;
            Some(pending(
                mitigation_decision_id(satellite_id, t, today),
                satellite_id,
                satellite,
                Suggestion::WeatherMitigation {
                    threat_type: t.kind.clone(),
                    priority,
                    recommendation: t.recommendation.clone(),
                    impact: t.impact.clone(),
                },
            ))
        })
        .collect()
}

/// Append derived decisions whose ids are not tracked yet. Existing entries
/// win, whatever their status. Returns how many were added.
pub fn merge_new(existing: &mut Vec<Decision>, derived: Vec<Decision>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|d| d.id.clone()).collect();
    let before = existing.len();
    for decision in derived {
        if seen.insert(decision.id.clone()) {
            existing.push(decision);
        }
    }
    existing.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ManeuverAction, Severity};

    fn suggestion(with: &str, distance: f64) -> ManeuverSuggestion {
        ManeuverSuggestion {
            event_with: with.to_string(),
            tca: "2024-10-25T12:00:00+00:00".to_string(),
            distance_km: distance,
            relative_speed_km_s: Some(10.0),
            action: ManeuverAction {
                kind: "out_of_plane_maneuver".to_string(),
                priority: "CRITICAL".to_string(),
                ..Default::default()
            },
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
    fn test_allowed_transitions() {
        use DecisionAction::*;
        use DecisionStatus::*;
        assert_eq!(Pending.apply(Approve).unwrap(), Approved);
        assert_eq!(Pending.apply(Reject).unwrap(), Rejected);
        assert_eq!(Approved.apply(Execute).unwrap(), Executing);
        assert_eq!(Executing.apply(Complete).unwrap(), Completed);
    }

    #[test]
    fn test_every_other_transition_is_rejected() {
        use DecisionAction::*;
        use DecisionStatus::*;
        let allowed = [
            (Pending, Approve),
            (Pending, Reject),
            (Approved, Execute),
            (Executing, Complete),
        ];
        for from in [Pending, Approved, Rejected, Executing, Completed] {
            for action in [Approve, Reject, Execute, Complete] {
                if allowed.contains(&(from, action)) {
                    continue;
                }
                assert!(
                    matches!(
                        from.apply(action),
                        Err(ApiError::InvalidTransition { .. })
                    ),
                    "{} should not accept {}",
                    from,
                    action
                );
            }
        }
    }

    #[test]
    fn test_failed_advance_leaves_decision_untouched() {
        let mut d = conjunction_decisions("sat-1", "ISS", &[suggestion("DEBRIS-1", 0.5)]).remove(0);
        let stamp = d.updated_at.clone();
        assert!(d.advance(DecisionAction::Execute).is_err());
        assert_eq!(d.status, DecisionStatus::Pending);
        assert_eq!(d.updated_at, stamp);
    }

    #[test]
    fn test_conjunction_decisions_are_pending_and_tagged() {
        let decisions = conjunction_decisions("sat-1", "ISS", &[suggestion("DEBRIS-1", 0.5)]);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].status, DecisionStatus::Pending);
        assert_eq!(decisions[0].id, "sat-1-debris-1-2024-10-25T12:00:00+00:00");
        assert!(matches!(
            decisions[0].suggestion,
            Suggestion::Conjunction { distance_km, .. } if distance_km == 0.5
        ));
    }

    #[test]
    fn test_merge_keeps_existing_status() {
        let mut existing = conjunction_decisions("sat-1", "ISS", &[suggestion("DEBRIS-1", 0.5)]);
        existing[0].advance(DecisionAction::Approve).unwrap();

        let again = conjunction_decisions(
            "sat-1",
            "ISS",
            &[suggestion("DEBRIS-1", 0.5), suggestion("DEBRIS-2", 2.0)],
        );
        let added = merge_new(&mut existing, again);

        assert_eq!(added, 1);
        assert_eq!(existing.len(), 2);
        assert_eq!(existing[0].status, DecisionStatus::Approved);
        assert_eq!(existing[1].status, DecisionStatus::Pending);
    }

    #[test]
    fn test_merge_dedups_within_batch() {
        let mut existing = Vec::new();
        let batch = conjunction_decisions(
            "sat-1",
            "ISS",
            &[suggestion("DEBRIS-1", 0.5), suggestion("DEBRIS-1", 0.5)],
        );
        assert_eq!(merge_new(&mut existing, batch), 1);
    }

    #[test]
    fn test_mitigation_skips_nominal_and_low() {
        let threats = vec![
            threat("Nominal Conditions", "LOW"),
            threat("Geomagnetic Activity", "LOW"),
            threat("Solar Flare", "CRITICAL"),
        ];
        let decisions = mitigation_decisions("sat-1", "ISS", &threats);
        assert_eq!(decisions.len(), 1);
        match &decisions[0].suggestion {
            Suggestion::WeatherMitigation {
                threat_type,
                priority,
                ..
            } => {
                assert_eq!(threat_type, "Solar Flare");
                assert_eq!(*priority, Severity::Critical);
            }
            other => panic!("unexpected suggestion {:?}", other),
        }
    }

    #[test]
    fn test_mitigation_ids_repeat_within_a_day() {
        let threats = vec![threat("Solar Flare", "CRITICAL")];
        let a = mitigation_decisions("sat-1", "ISS", &threats);
        let b = mitigation_decisions("sat-1", "ISS", &threats);
        assert_eq!(a[0].id, b[0].id);
    }
}
