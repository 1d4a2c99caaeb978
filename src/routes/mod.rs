/// Application routes configuration
use crate::handlers::{
    acknowledge_alert, add_satellite, alert_details, analyze, approve_decision, execute_decision,
    get_scene, get_space_weather, health, list_alerts, list_decisions, list_satellites,
    load_samples, refresh_space_weather, reject_decision, remove_satellite, select_satellite,
    AppState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Roster
        .route("/satellites", get(list_satellites).post(add_satellite))
        .route("/satellites/samples", post(load_samples))
        .route("/satellites/:id", delete(remove_satellite))
        .route("/satellites/:id/select", post(select_satellite))
        // Visualization feed
        .route("/scene", get(get_scene))
        // Alerts
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id/ack", post(acknowledge_alert))
        .route("/alerts/:id/details", get(alert_details))
        // Decisions
        .route("/decisions", get(list_decisions))
        .route("/decisions/:id/approve", post(approve_decision))
        .route("/decisions/:id/reject", post(reject_decision))
        .route("/decisions/:id/execute", post(execute_decision))
        // Space weather
        .route("/space-weather", get(get_space_weather))
        .route("/space-weather/refresh", post(refresh_space_weather))
        // Legacy single-satellite analysis
        .route("/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
