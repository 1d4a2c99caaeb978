/// Periodic refresh tasks
use crate::config::PollIntervals;
use crate::services::DashboardService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Handles of the three polling loops. Dropping the scheduler leaves the
/// loops running; call `shutdown` to stop them.
pub struct Scheduler {
    handles: Vec<(&'static str, JoinHandle<()>)>,
    service: Arc<DashboardService>,
}

impl Scheduler {
    /// Start all background refresh tasks
    pub fn start(service: Arc<DashboardService>, intervals: &PollIntervals) -> Self {
        let mut handles = Vec::with_capacity(3);

        // Space weather: once now, then on the interval
        {
            let service = service.clone();
            let interval = intervals.weather_seconds;
            handles.push((
                "space-weather",
                tokio::spawn(async move {
                    info!("Starting space weather task (interval: {}s)", interval);
                    loop {
                        if let Err(e) = service.refresh_weather().await {
                            error!("Space weather fetch error: {:?}", e);
                        }
                        tokio::time::sleep(Duration::from_secs(interval)).await;
                    }
                }),
            ));
        }

        // Positions: skipped while the roster is empty
        {
            let service = service.clone();
            let interval = intervals.positions_seconds;
            handles.push((
                "positions",
                tokio::spawn(async move {
                    info!("Starting position refresh task (interval: {}s)", interval);
                    loop {
                        tokio::time::sleep(Duration::from_secs(interval)).await;
                        if let Err(e) = service.refresh_positions().await {
                            error!("Position refresh error: {:?}", e);
                        }
                    }
                }),
            ));
        }

        // Fleet threat analysis: skipped while the roster is empty
        {
            let service = service.clone();
            let interval = intervals.analysis_seconds;
            handles.push((
                "fleet-analysis",
                tokio::spawn(async move {
                    info!("Starting fleet analysis task (interval: {}s)", interval);
                    loop {
                        tokio::time::sleep(Duration::from_secs(interval)).await;
                        if let Err(e) = service.refresh_analysis().await {
                            error!("Fleet analysis error: {:?}", e);
                        }
                    }
                }),
            ));
        }

        info!("All background tasks started successfully");
        Self { handles, service }
    }

    /// Unmount the dashboard and stop every polling loop. Responses still in
    /// flight are dropped by the unmounted service.
    pub fn shutdown(self) {
        self.service.unmount();
        for (name, handle) in self.handles {
            handle.abort();
            info!("Stopped {} task", name);
        }
    }
}
