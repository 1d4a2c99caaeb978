/// Application configuration module
use std::env;
use std::time::Duration;

/// Backend used when `MISSION_API_URL` is not set: a locally run
/// instance of the analysis service on its default port
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub listen_addr: String,
    pub http_timeout_seconds: u64,
    pub alert_cap: usize,
    pub execute_delay_seconds: u64,
    pub poll_intervals: PollIntervals,
    pub analysis: AnalysisParams,
}

#[derive(Clone, Debug)]
pub struct PollIntervals {
    pub weather_seconds: u64,
    pub positions_seconds: u64,
    pub analysis_seconds: u64,
}

/// Screening parameters forwarded to `/analyze-fleet`
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisParams {
    pub window_hours: f64,
    pub step_seconds: f64,
    pub threshold_km: f64,
    pub max_catalog: u32,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            weather_seconds: 300,
            positions_seconds: 10,
            analysis_seconds: 60,
        }
    }
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window_hours: 12.0,
            step_seconds: 60.0,
            threshold_km: 5.0,
            max_catalog: 200,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("MISSION_API_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let defaults = PollIntervals::default();
        let poll_intervals = PollIntervals {
            weather_seconds: env_u64("WEATHER_EVERY_SECONDS", defaults.weather_seconds),
            positions_seconds: env_u64("POSITIONS_EVERY_SECONDS", defaults.positions_seconds),
            analysis_seconds: env_u64("ANALYSIS_EVERY_SECONDS", defaults.analysis_seconds),
        };
        if poll_intervals.weather_seconds == 0
            || poll_intervals.positions_seconds == 0
            || poll_intervals.analysis_seconds == 0
        {
            anyhow::bail!("poll intervals must be at least one second");
        }

        let defaults = AnalysisParams::default();
        let analysis = AnalysisParams {
            window_hours: env_f64("ANALYSIS_WINDOW_HOURS", defaults.window_hours),
            step_seconds: env_f64("ANALYSIS_STEP_SECONDS", defaults.step_seconds),
            threshold_km: env_f64("ANALYSIS_THRESHOLD_KM", defaults.threshold_km),
            max_catalog: env_u64("ANALYSIS_MAX_CATALOG", u64::from(defaults.max_catalog)) as u32,
        };

        Ok(Self {
            api_url,
            listen_addr,
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 30),
            alert_cap: env_u64("ALERT_CAP", 50).max(1) as usize,
            execute_delay_seconds: env_u64("EXECUTE_DELAY_SECONDS", 3),
            poll_intervals,
            analysis,
        })
    }

    pub fn execute_delay(&self) -> Duration {
        Duration::from_secs(self.execute_delay_seconds)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}
