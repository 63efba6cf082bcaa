//! Typed rows of the feature table and plot dataset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::region::{Coordinate, RegionId};

/// One feature-table record keyed by (timestamp, region).
///
/// `total_pickups` is the observed demand for the interval. It is kept for
/// validation and plotting only and never reaches the model: inference
/// goes through [`FeatureRow::model_input`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "tpep_pickup_datetime", with = "super::time::pickup_datetime")]
    pub timestamp: NaiveDateTime,
    pub region: RegionId,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub lag_4: f64,
    pub avg_pickups: f64,
    pub day_of_week: u32,
    pub total_pickups: f64,
}

impl FeatureRow {
    /// Label-free projection consumed by the inference pipeline.
    pub fn model_input(&self) -> ModelInput {
        ModelInput {
            region: self.region,
            lag_1: self.lag_1,
            lag_2: self.lag_2,
            lag_3: self.lag_3,
            lag_4: self.lag_4,
            avg_pickups: self.avg_pickups,
            day_of_week: self.day_of_week,
        }
    }

    pub(crate) fn numeric_fields_finite(&self) -> bool {
        [
            self.lag_1,
            self.lag_2,
            self.lag_3,
            self.lag_4,
            self.avg_pickups,
            self.total_pickups,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Model input columns of a feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInput {
    pub region: RegionId,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub lag_4: f64,
    pub avg_pickups: f64,
    pub day_of_week: u32,
}

impl ModelInput {
    /// Columns an encoder may reference.
    pub const COLUMNS: [&'static str; 7] = [
        "region",
        "lag_1",
        "lag_2",
        "lag_3",
        "lag_4",
        "avg_pickups",
        "day_of_week",
    ];

    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "region" => Some(f64::from(self.region.value())),
            "lag_1" => Some(self.lag_1),
            "lag_2" => Some(self.lag_2),
            "lag_3" => Some(self.lag_3),
            "lag_4" => Some(self.lag_4),
            "avg_pickups" => Some(self.avg_pickups),
            "day_of_week" => Some(f64::from(self.day_of_week)),
            _ => None,
        }
    }
}

/// Historical pickup location with its region label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub region: RegionId,
}

impl PlotPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.pickup_latitude, self.pickup_longitude)
    }
}
