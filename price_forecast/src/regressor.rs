//! Price regressors

use crate::error::{ForecastError, Result};
use crate::gbdt::GbdtRegressor;
use serde::{Deserialize, Serialize};

/// A trained, serializable price regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regressor {
    /// Ridge-fitted linear model
    Linear(LinearRegressor),
    /// Gradient-boosted tree ensemble, importable from LightGBM model text
    GradientBoost(GbdtRegressor),
}

impl Regressor {
    /// Predict a scalar price from a schema-ordered feature vector
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        let expected = self.feature_count();
        if features.len() != expected {
            return Err(ForecastError::DimensionMismatch {
                expected,
                got: features.len(),
            });
        }

        match self {
            Regressor::Linear(model) => Ok(model.predict(features)),
            Regressor::GradientBoost(model) => Ok(model.predict(features)),
        }
    }

    /// Number of input features the model expects
    pub fn feature_count(&self) -> usize {
        match self {
            Regressor::Linear(model) => model.weights.len(),
            Regressor::GradientBoost(model) => model.feature_count(),
        }
    }

    /// Short name used in metadata and forecast responses
    pub fn kind(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "linear",
            Regressor::GradientBoost(_) => "gradient_boost",
        }
    }
}

/// Linear model over schema-ordered features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_predict() {
        let model = Regressor::Linear(LinearRegressor::new(vec![2.0, 0.5], 1.0));
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 9.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = Regressor::Linear(LinearRegressor::new(vec![2.0, 0.5], 1.0));
        assert!(matches!(
            model.predict(&[3.0]),
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let model = Regressor::Linear(LinearRegressor::new(vec![1.0, -2.0], 0.25));
        let json = serde_json::to_string(&model).unwrap();
        let back: Regressor = serde_json::from_str(&json).unwrap();
        assert_eq!(model, back);
    }
}
