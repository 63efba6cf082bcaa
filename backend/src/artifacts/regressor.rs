//! Linear demand regressor.

use serde::{Deserialize, Serialize};

use super::error::{ArtifactError, ArtifactResult};
use super::pipeline::Predict;

/// Ordinary least squares model over the encoded feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> ArtifactResult<Self> {
        let model = Self {
            intercept,
            coefficients,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> ArtifactResult<()> {
        if self.coefficients.is_empty() {
            return Err(ArtifactError::invalid("regressor", "no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::invalid("regressor", "non-finite parameters"));
        }
        Ok(())
    }

    pub fn predict_row(&self, features: &[f64]) -> ArtifactResult<f64> {
        if features.len() != self.coefficients.len() {
            return Err(ArtifactError::ShapeMismatch {
                stage: "regressor",
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }
}

impl Predict for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, encoded: &[Vec<f64>]) -> ArtifactResult<Vec<f64>> {
        encoded.iter().map(|row| self.predict_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_row() {
        let model = LinearRegressor::new(1.0, vec![2.0, -0.5]).unwrap();
        assert_eq!(model.predict_row(&[3.0, 4.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_predict_batch_keeps_order() {
        let model = LinearRegressor::new(0.0, vec![1.0]).unwrap();
        let out = model.predict(&[vec![3.0], vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(out, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let model = LinearRegressor::new(0.0, vec![1.0, 1.0]).unwrap();
        assert!(model.predict(&[vec![1.0]]).is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(LinearRegressor::new(0.0, vec![]).is_err());
        assert!(LinearRegressor::new(f64::NAN, vec![1.0]).is_err());
        assert!(LinearRegressor::new(0.0, vec![f64::INFINITY]).is_err());
    }
}
