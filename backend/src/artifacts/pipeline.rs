//! Two-stage inference pipeline: column encoding followed by regression.

use super::encoder::ColumnEncoder;
use super::error::{ArtifactError, ArtifactResult};
use super::regressor::LinearRegressor;
use crate::models::ModelInput;

/// Feature-space mapping applied before the regressor.
pub trait Transform {
    /// Width of every encoded row.
    fn output_width(&self) -> usize;

    fn transform(&self, inputs: &[ModelInput]) -> ArtifactResult<Vec<Vec<f64>>>;
}

/// Scalar output stage.
pub trait Predict {
    fn n_features(&self) -> usize;

    fn predict(&self, encoded: &[Vec<f64>]) -> ArtifactResult<Vec<f64>>;
}

/// Fixed encoder + regressor composition.
///
/// Both stages are fit offline; the pipeline itself holds no state beyond
/// them, so the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct InferencePipeline<T = ColumnEncoder, P = LinearRegressor> {
    encoder: T,
    regressor: P,
}

impl<T: Transform, P: Predict> InferencePipeline<T, P> {
    pub fn new(encoder: T, regressor: P) -> ArtifactResult<Self> {
        if encoder.output_width() != regressor.n_features() {
            return Err(ArtifactError::Inconsistent(format!(
                "encoder produces {} features but the regressor expects {}",
                encoder.output_width(),
                regressor.n_features()
            )));
        }
        Ok(Self { encoder, regressor })
    }

    pub fn encoder(&self) -> &T {
        &self.encoder
    }

    pub fn regressor(&self) -> &P {
        &self.regressor
    }

    /// One raw regressor output per input row, in input order.
    pub fn predict(&self, inputs: &[ModelInput]) -> ArtifactResult<Vec<f64>> {
        let encoded = self.encoder.transform(inputs)?;
        let predictions = self.regressor.predict(&encoded)?;
        if predictions.len() != inputs.len() {
            return Err(ArtifactError::ShapeMismatch {
                stage: "pipeline",
                expected: inputs.len(),
                actual: predictions.len(),
            });
        }
        Ok(predictions)
    }
}
