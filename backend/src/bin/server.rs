//! Demand map HTTP server binary.
//!
//! Loads configuration and artifacts, sets up the HTTP router, and serves
//! requests.
//!
//! # Usage
//!
//! ```bash
//! # Artifacts from the current directory, in-memory registry
//! cargo run --bin demand-server
//!
//! # Production model from an MLflow registry
//! MLFLOW_TRACKING_URI=http://localhost:5000 cargo run --bin demand-server
//! ```
//!
//! # Environment Variables
//!
//! - `DEMAND_CONFIG`: Path to the configuration file (default: search for `demand.toml`)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REGISTRY_TYPE`: `local` or `mlflow`
//! - `MLFLOW_TRACKING_URI`: MLflow tracking server URL
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use demand_map::bootstrap;
use demand_map::config::AppConfig;
use demand_map::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting demand map server");

    let config = AppConfig::load()?;
    config.validate()?;

    let lifecycle = bootstrap::lifecycle_from_config(&config)?;
    let artifacts = bootstrap::load_artifacts(&config, &lifecycle).await?;
    info!(regions = artifacts.region_count(), "Artifacts ready");

    let state = AppState::new(artifacts, lifecycle)
        .with_window(config.dashboard.window()?)
        .with_neighborhood_regions(config.dashboard.neighborhood_regions);

    let app = create_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
