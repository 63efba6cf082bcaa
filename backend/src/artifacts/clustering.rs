//! Mini-batch k-means model fit on scaled pickup coordinates.

use serde::{Deserialize, Serialize};

use super::error::{ArtifactError, ArtifactResult};
use crate::models::RegionId;

/// Fitted k-means centroids. Centroid `i` defines region `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansModel {
    pub cluster_centers: Vec<Vec<f64>>,
}

impl KMeansModel {
    pub fn new(cluster_centers: Vec<Vec<f64>>) -> ArtifactResult<Self> {
        let model = Self { cluster_centers };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        let first = self
            .cluster_centers
            .first()
            .ok_or_else(|| ArtifactError::invalid("clustering model", "no cluster centers"))?;
        if first.is_empty() {
            return Err(ArtifactError::invalid("clustering model", "zero-dimensional centers"));
        }
        for (idx, center) in self.cluster_centers.iter().enumerate() {
            if center.len() != first.len() {
                return Err(ArtifactError::invalid(
                    "clustering model",
                    format!("center {} has {} dimensions, expected {}", idx, center.len(), first.len()),
                ));
            }
            if center.iter().any(|v| !v.is_finite()) {
                return Err(ArtifactError::invalid(
                    "clustering model",
                    format!("center {} has non-finite values", idx),
                ));
            }
        }
        Ok(())
    }

    pub fn n_clusters(&self) -> usize {
        self.cluster_centers.len()
    }

    pub fn n_features(&self) -> usize {
        self.cluster_centers.first().map_or(0, Vec::len)
    }

    /// Euclidean distance from `sample` to every centroid, indexed by region.
    pub fn transform(&self, sample: &[f64]) -> ArtifactResult<Vec<f64>> {
        if sample.len() != self.n_features() {
            return Err(ArtifactError::ShapeMismatch {
                stage: "clustering model",
                expected: self.n_features(),
                actual: sample.len(),
            });
        }
        Ok(self
            .cluster_centers
            .iter()
            .map(|center| {
                center
                    .iter()
                    .zip(sample)
                    .map(|(c, x)| (c - x).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect())
    }

    /// Closest centroid; the lowest region id wins ties.
    pub fn predict(&self, sample: &[f64]) -> ArtifactResult<RegionId> {
        let distances = self.transform(sample)?;
        let mut best = 0usize;
        for (idx, distance) in distances.iter().enumerate().skip(1) {
            if distance.total_cmp(&distances[best]).is_lt() {
                best = idx;
            }
        }
        Ok(RegionId::new(best as u32))
    }
}
