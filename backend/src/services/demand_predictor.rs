//! Demand inference over the feature table.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::artifacts::{ArtifactContext, ArtifactError, FeatureTable, InferencePipeline};
use crate::models::{FeatureRow, ModelInput, RegionId};

use super::error::{DemandError, DemandResult};

/// Predicts pickups per region for a 15-minute interval.
///
/// Pure with respect to its inputs: the same timestamp and region set
/// always yield bit-identical predictions.
#[derive(Debug, Clone, Copy)]
pub struct DemandPredictor<'a> {
    features: &'a FeatureTable,
    pipeline: &'a InferencePipeline,
}

impl<'a> DemandPredictor<'a> {
    pub fn new(context: &'a ArtifactContext) -> Self {
        Self::from_parts(context.features(), context.pipeline())
    }

    pub fn from_parts(features: &'a FeatureTable, pipeline: &'a InferencePipeline) -> Self {
        Self { features, pipeline }
    }

    /// Predictions for exactly the requested regions.
    pub fn predict_demand(
        &self,
        timestamp: NaiveDateTime,
        regions: &[RegionId],
    ) -> DemandResult<BTreeMap<RegionId, f64>> {
        let rows = self.rows_at(timestamp)?;
        let wanted: BTreeSet<RegionId> = regions.iter().copied().collect();

        let selected: Vec<&FeatureRow> = rows.iter().filter(|row| wanted.contains(&row.region)).collect();
        if selected.len() != wanted.len() {
            let present: BTreeSet<RegionId> = selected.iter().map(|row| row.region).collect();
            if let Some(missing) = wanted.difference(&present).next() {
                return Err(DemandError::RegionNotFound {
                    region: *missing,
                    timestamp,
                });
            }
        }

        self.run(selected)
    }

    /// Predictions for every region with a row at `timestamp`.
    pub fn predict_all(&self, timestamp: NaiveDateTime) -> DemandResult<BTreeMap<RegionId, f64>> {
        let rows = self.rows_at(timestamp)?;
        self.run(rows.iter().collect())
    }

    fn rows_at(&self, timestamp: NaiveDateTime) -> DemandResult<&'a [FeatureRow]> {
        let rows = self.features.rows_at(&timestamp);
        if rows.is_empty() {
            return Err(DemandError::TimestampNotFound(timestamp));
        }
        Ok(rows)
    }

    // Rows arrive sorted by region from the feature table.
    fn run(&self, rows: Vec<&FeatureRow>) -> DemandResult<BTreeMap<RegionId, f64>> {
        let inputs: Vec<ModelInput> = rows.iter().map(|row| row.model_input()).collect();
        let raw = self.pipeline.predict(&inputs)?;

        let mut predictions = BTreeMap::new();
        for (input, value) in inputs.iter().zip(raw) {
            if !value.is_finite() {
                return Err(DemandError::Inference(ArtifactError::invalid(
                    "regressor",
                    format!("non-finite prediction for region {}", input.region),
                )));
            }
            predictions.insert(input.region, value.max(0.0));
        }
        tracing::debug!(regions = predictions.len(), "Predicted demand");
        Ok(predictions)
    }
}
