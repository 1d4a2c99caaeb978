/// Orbital analysis backend client
use crate::domain::backend::{
    AnalyzeRequest, FleetAnalysisRequest, FleetAnalysisResponse, PositionsRequest,
    PositionsResponse, SatelliteRef, SpaceWeatherSnapshot,
};
use crate::errors::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Operations the dashboard needs from the backend.
///
/// `BackendClient` talks HTTP; tests substitute a fake.
#[async_trait]
pub trait MissionBackend: Send + Sync {
    /// Global space-weather snapshot
    async fn space_weather(&self) -> ApiResult<SpaceWeatherSnapshot>;

    /// Current positions (and location-specific weather) for a set of satellites
    async fn positions(&self, satellites: &[SatelliteRef]) -> ApiResult<PositionsResponse>;

    /// Conjunction screening for a set of satellites. A 502 surfaces as
    /// `ApiError::BackendUnavailable`.
    async fn analyze_fleet(
        &self,
        request: &FleetAnalysisRequest<'_>,
    ) -> ApiResult<FleetAnalysisResponse>;

    /// Legacy single-satellite screening, returned as the backend sent it
    async fn analyze(&self, request: &AnalyzeRequest) -> ApiResult<Value>;

    async fn health(&self) -> ApiResult<Value>;
}

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("mission-control/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// Backend client over HTTP/JSON
pub struct BackendClient {
    http_client: HttpClient,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: String, timeout: Duration) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map non-success statuses onto the error taxonomy
async fn check_status(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);

    if status == StatusCode::BAD_GATEWAY {
        return Err(ApiError::BackendUnavailable(message));
    }
    Err(ApiError::Upstream {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl MissionBackend for BackendClient {
    async fn space_weather(&self) -> ApiResult<SpaceWeatherSnapshot> {
        let resp = self
            .http_client
            .get_client()
            .get(self.url("/space-weather"))
            .send()
            .await?;

        let json = check_status(resp).await?.json().await?;
        Ok(json)
    }

    async fn positions(&self, satellites: &[SatelliteRef]) -> ApiResult<PositionsResponse> {
        let resp = self
            .http_client
            .get_client()
            .post(self.url("/positions"))
            .json(&PositionsRequest { satellites })
            .send()
            .await?;

        let json = check_status(resp).await?.json().await?;
        Ok(json)
    }

    async fn analyze_fleet(
        &self,
        request: &FleetAnalysisRequest<'_>,
    ) -> ApiResult<FleetAnalysisResponse> {
        let resp = self
            .http_client
            .get_client()
            .post(self.url("/analyze-fleet"))
            .json(request)
            .send()
            .await?;

        let json = check_status(resp).await?.json().await?;
        Ok(json)
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> ApiResult<Value> {
        let resp = self
            .http_client
            .get_client()
            .post(self.url("/analyze"))
            .json(request)
            .send()
            .await?;

        let json = check_status(resp).await?.json().await?;
        Ok(json)
    }

    async fn health(&self) -> ApiResult<Value> {
        let resp = self
            .http_client
            .get_client()
            .get(self.url("/health"))
            .send()
            .await?;

        let json = check_status(resp).await?.json().await?;
        Ok(json)
    }
}
