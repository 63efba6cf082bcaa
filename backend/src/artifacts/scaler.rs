//! Standard scaler fit on pickup coordinates.

use serde::{Deserialize, Serialize};

use super::error::{ArtifactError, ArtifactResult};

/// Per-feature standardisation `(x - mean) / scale`.
///
/// `scale` is stored as fit; zero-variance features were already replaced
/// by `1.0` at fit time, so a zero here means a corrupt artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> ArtifactResult<Self> {
        let scaler = Self {
            feature_names: Vec::new(),
            mean,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        if self.mean.is_empty() {
            return Err(ArtifactError::invalid("scaler", "no features"));
        }
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::invalid(
                "scaler",
                format!(
                    "mean has {} entries but scale has {}",
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != self.mean.len() {
            return Err(ArtifactError::invalid(
                "scaler",
                "feature_names length does not match mean",
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ArtifactError::invalid("scaler", "non-finite mean"));
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(ArtifactError::invalid("scaler", "scale must be finite and non-zero"));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, sample: &[f64]) -> ArtifactResult<Vec<f64>> {
        if sample.len() != self.n_features() {
            return Err(ArtifactError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features(),
                actual: sample.len(),
            });
        }
        Ok(sample
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
