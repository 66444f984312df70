//! Feature scaling

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-12;

/// Per-column standardization: `(x - mean) / std`.
///
/// A column with zero spread maps to 0.0 rather than dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations from a sample matrix
    pub fn fit(matrix: &[Vec<f64>]) -> Result<Self> {
        let rows = matrix.len();
        if rows == 0 {
            return Err(ForecastError::TrainingError(
                "Cannot fit scaler on an empty matrix".to_string(),
            ));
        }
        let cols = matrix[0].len();
        if matrix.iter().any(|row| row.len() != cols) {
            return Err(ForecastError::TrainingError(
                "Cannot fit scaler on a ragged matrix".to_string(),
            ));
        }

        let mut means = vec![0.0; cols];
        for row in matrix {
            for (j, value) in row.iter().enumerate() {
                means[j] += value;
            }
        }
        for mean in means.iter_mut() {
            *mean /= rows as f64;
        }

        let mut stds = vec![0.0; cols];
        for row in matrix {
            for (j, value) in row.iter().enumerate() {
                stds[j] += (value - means[j]).powi(2);
            }
        }
        for std in stds.iter_mut() {
            *std = (*std / rows as f64).sqrt();
        }

        Ok(Self { means, stds })
    }

    /// Number of columns the scaler was fitted on
    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Standardize one feature vector
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.means.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.means.len(),
                got: features.len(),
            });
        }

        Ok(features
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(value, (mean, std))| {
                if std.abs() <= EPSILON {
                    0.0
                } else {
                    (value - mean) / std
                }
            })
            .collect())
    }

    /// Standardize a whole sample matrix
    pub fn transform_matrix(&self, matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        matrix.iter().map(|row| self.transform(row)).collect()
    }
}
