//! Route table and middleware stack.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Health at the root, everything else under `/v1`.
pub fn create_router(state: AppState) -> Router {
    // Map clients are served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/regions", get(handlers::list_regions))
        .route("/demand-map", get(handlers::get_demand_map))
        .route("/predictions", get(handlers::get_predictions))
        .route("/models/{name}/latest", get(handlers::get_latest_model));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
