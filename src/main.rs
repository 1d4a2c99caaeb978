/// Mission control dashboard service entry point
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod routes;
mod scene;
mod scheduler;
mod services;
mod store;
mod utils;

use crate::clients::BackendClient;
use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::routes::build_router;
use crate::scene::LoggingSink;
use crate::scheduler::Scheduler;
use crate::services::{DashboardService, ServiceSettings};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    // Initialize backend client
    let client = BackendClient::new(
        config.api_url.clone(),
        Duration::from_secs(config.http_timeout_seconds),
    )?;
    info!("Orbital analysis backend at {}", client.base_url());

    // Initialize dashboard service
    let service = Arc::new(DashboardService::new(
        Arc::new(client),
        ServiceSettings {
            analysis: config.analysis.clone(),
            execute_delay: config.execute_delay(),
            alert_cap: config.alert_cap,
        },
    ));

    // Renderer feed
    tokio::spawn(scene::drive(LoggingSink::default(), service.subscribe_scene()));

    // Start background tasks
    let scheduler = Scheduler::start(service.clone(), &config.poll_intervals);

    // Build router
    let app = build_router(AppState {
        service: service.clone(),
    });

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("mission_control listening on {}", config.listen_addr);

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.shutdown();
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
