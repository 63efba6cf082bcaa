use serde::{Deserialize, Serialize};

use crate::models::RegionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPrediction {
    pub region: RegionId,
    pub demand: f64,
}

/// Demand for a set of regions at one timestamp, ascending by region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionsData {
    pub timestamp: String,
    pub interval_end: String,
    pub predictions: Vec<RegionPrediction>,
}

/// Route function name constant
pub const GET_PREDICTIONS: &str = "get_predictions";
