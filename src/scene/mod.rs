/// Visualization feed for an external renderer
use crate::domain::{Position, Satellite, SatelliteStatus, ThreatLevel};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Altitude shown for satellites whose position has not been fetched yet (km)
pub const FALLBACK_ALT_KM: f64 = 400.0;

/// Earth radius plus the fallback altitude, placed on the z axis (km)
pub const FALLBACK_Z_KM: f64 = 6771.0;

/// Position used until the first position poll lands
pub fn fallback_position() -> Position {
    Position {
        lat: 0.0,
        lon: 0.0,
        alt: FALLBACK_ALT_KM,
        x: 0.0,
        y: 0.0,
        z: FALLBACK_Z_KM,
        vx: None,
        vy: None,
        vz: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSatellite {
    pub id: String,
    pub name: String,
    pub color: String,
    pub status: SatelliteStatus,
    pub threat_level: Option<ThreatLevel>,
    pub position: Position,
    pub is_selected: bool,
}

pub type SceneSnapshot = Arc<[SceneSatellite]>;

/// Build the renderer's view of the roster
pub fn snapshot(satellites: &[Satellite], selected: Option<&str>) -> SceneSnapshot {
    satellites
        .iter()
        .map(|sat| SceneSatellite {
            id: sat.id.clone(),
            name: sat.name.clone(),
            color: sat.color.clone(),
            status: sat.status,
            threat_level: sat.threat_level,
            position: sat.position.clone().unwrap_or_else(fallback_position),
            is_selected: selected == Some(sat.id.as_str()),
        })
        .collect()
}

/// Publishes read-only roster snapshots to any number of subscribers
pub struct SceneFeed {
    tx: watch::Sender<SceneSnapshot>,
}

impl Default for SceneFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SceneSnapshot::from(Vec::new()));
        Self { tx }
    }

    pub fn publish(&self, snapshot: SceneSnapshot) {
        // send_replace keeps the latest value even with no subscribers
        self.tx.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> watch::Receiver<SceneSnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SceneSnapshot {
        self.tx.borrow().clone()
    }
}

/// Renderer-side consumer of roster snapshots
#[async_trait]
pub trait SceneSink: Send {
    async fn reconcile(&mut self, roster: &[SceneSatellite]);
}

/// Feed every published snapshot to `sink` until the feed is dropped
pub async fn drive<S: SceneSink>(mut sink: S, mut rx: watch::Receiver<SceneSnapshot>) {
    loop {
        let roster = rx.borrow_and_update().clone();
        sink.reconcile(&roster).await;
        if rx.changed().await.is_err() {
            debug!("Scene feed closed, stopping sink");
            break;
        }
    }
}

/// Sink that only logs what a renderer would add or drop
#[derive(Default)]
pub struct LoggingSink {
    known: Vec<String>,
}

#[async_trait]
impl SceneSink for LoggingSink {
    async fn reconcile(&mut self, roster: &[SceneSatellite]) {
        let added = roster
            .iter()
            .filter(|s| !self.known.contains(&s.id))
            .count();
        let removed = self
            .known
            .iter()
            .filter(|id| !roster.iter().any(|s| &s.id == *id))
            .count();
        if added > 0 || removed > 0 {
            info!(
                "Scene reconciled: {} objects ({} added, {} removed)",
                roster.len(),
                added,
                removed
            );
        }
        self.known = roster.iter().map(|s| s.id.clone()).collect();
    }
}
