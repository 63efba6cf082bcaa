//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDateTime;

use super::dto::{
    DemandMapData, DemandMapQuery, HealthResponse, ModelVersionInfo, PredictionsData,
    PredictionsQuery, RegionsData, StageQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::time::{is_interval_aligned, parse_timestamp};
use crate::models::{Coordinate, RegionId};
use crate::registry::Stage;
use crate::routes::demand_map::MapMode;
use crate::services::{self, DemandError, DemandMapRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting loaded artifacts and registry reachability.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let registry_status = match state.lifecycle.registry().health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        regions: state.artifacts.region_count(),
        artifacts: state.artifacts.fingerprints().clone(),
        registry: registry_status,
    }))
}

// =============================================================================
// Regions and Predictions
// =============================================================================

/// GET /v1/regions
///
/// List every region with its colour and historical sample count.
pub async fn list_regions(State(state): State<AppState>) -> HandlerResult<RegionsData> {
    Ok(Json(services::region_summaries(&state.artifacts)))
}

/// GET /v1/demand-map?date=&time=[&mode=][&lat=&lon=][&k=]
///
/// Build map data around the given location, or a random historical
/// pickup when no location is sent.
pub async fn get_demand_map(
    State(state): State<AppState>,
    Query(query): Query<DemandMapQuery>,
) -> HandlerResult<DemandMapData> {
    let timestamp = request_timestamp(&state, &query.date, &query.time)?;

    let mode = match query.mode.as_deref() {
        Some(raw) => raw.parse::<MapMode>().map_err(invalid_input)?,
        None => MapMode::default(),
    };

    let location = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        (None, None) => {
            let mut rng = rand::thread_rng();
            services::sample_reference_location(&state.artifacts, &mut rng).ok_or_else(|| {
                AppError::Internal("plot dataset is empty; no reference location".to_string())
            })?
        }
        _ => {
            return Err(invalid_input("lat and lon must be given together"))
        }
    };

    let request = DemandMapRequest::new(timestamp, mode, location)
        .with_neighborhood_size(query.k.unwrap_or(state.neighborhood_regions));
    let data = services::build_demand_map(&state.artifacts, &request)?;
    Ok(Json(data))
}

/// GET /v1/predictions?date=&time=[&regions=1,2,3]
///
/// Predicted pickups per region for one interval.
pub async fn get_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionsQuery>,
) -> HandlerResult<PredictionsData> {
    let timestamp = request_timestamp(&state, &query.date, &query.time)?;
    let regions = match query.regions.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_region_list(raw)?),
        _ => None,
    };
    let data = services::build_predictions(&state.artifacts, timestamp, regions.as_deref())?;
    Ok(Json(data))
}

// =============================================================================
// Model Registry
// =============================================================================

/// GET /v1/models/{name}/latest?stage=
///
/// Newest version of a registered model in a stage (Production by default).
pub async fn get_latest_model(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<StageQuery>,
) -> HandlerResult<ModelVersionInfo> {
    let stage = match query.stage.as_deref() {
        Some(raw) => raw.parse::<Stage>().map_err(invalid_input)?,
        None => Stage::Production,
    };
    let version = state.lifecycle.latest_in_stage(&name, stage).await?;
    Ok(Json(version.into()))
}

// =============================================================================
// Helpers
// =============================================================================

/// Every rejected query parameter reports as `INVALID_INPUT`.
fn invalid_input(message: impl Into<String>) -> AppError {
    DemandError::InvalidInput(message.into()).into()
}

fn request_timestamp(state: &AppState, date: &str, time: &str) -> Result<NaiveDateTime, AppError> {
    let timestamp = parse_timestamp(date, time).map_err(invalid_input)?;
    if !state.window.contains(timestamp.date()) {
        return Err(invalid_input(format!(
            "Date {} is outside the supported range {} to {}",
            timestamp.date(),
            state.window.start,
            state.window.end
        )));
    }
    if !is_interval_aligned(&timestamp) {
        return Err(invalid_input(format!(
            "Time {} is not on a 15-minute boundary",
            timestamp.time()
        )));
    }
    Ok(timestamp)
}

fn parse_region_list(raw: &str) -> Result<Vec<RegionId>, AppError> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map(RegionId::new)
                .map_err(|_| invalid_input(format!("Invalid region id '{}'", part.trim())))
        })
        .collect()
}
