//! Data Transfer Objects for the HTTP API.
//!
//! Response payloads live in the `routes` modules; this module adds the
//! query parameter types and the health response.

use serde::{Deserialize, Serialize};

pub use crate::artifacts::ArtifactFingerprints;
pub use crate::routes::demand_map::{DemandMapData, LegendEntry, LocationInfo, MapMode, MapPoint};
pub use crate::routes::model::ModelVersionInfo;
pub use crate::routes::predictions::{PredictionsData, RegionPrediction};
pub use crate::routes::regions::{RegionInfo, RegionsData};

/// Query parameters for the demand map endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemandMapQuery {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    /// `complete` or `neighborhood`
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Neighborhood size
    #[serde(default)]
    pub k: Option<usize>,
}

/// Query parameters for the predictions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PredictionsQuery {
    pub date: String,
    pub time: String,
    /// Comma-separated region ids; all regions when absent
    #[serde(default)]
    pub regions: Option<String>,
}

/// Query parameters for model lookups.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StageQuery {
    #[serde(default)]
    pub stage: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub regions: usize,
    pub artifacts: ArtifactFingerprints,
    pub registry: String,
}
