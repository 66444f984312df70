//! Model artifact metadata

use chrono::{DateTime, Utc};
use feature_math::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything recorded alongside a trained regressor.
///
/// The feature schema stored here is the contract between training and
/// prediction: the forecaster vectorizes feature records in exactly this
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Regressor kind, e.g. `"linear"` or `"gradient_boost"`
    pub model_type: String,
    /// Semantic version of the training pipeline that produced the model
    pub version: String,
    /// Ordered input features used at training time
    pub features: FeatureSchema,
    /// Training hyperparameters
    pub hyperparameters: BTreeMap<String, f64>,
    /// Holdout evaluation metrics
    pub metrics: BTreeMap<String, f64>,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
}

impl ModelMetadata {
    /// Label reported in forecast responses, e.g. `"linear v0.1.0"`
    pub fn model_label(&self) -> String {
        format!("{} v{}", self.model_type, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_label() {
        let metadata = ModelMetadata {
            model_type: "linear".to_string(),
            version: "0.1.0".to_string(),
            features: FeatureSchema::standard(),
            hyperparameters: BTreeMap::new(),
            metrics: BTreeMap::new(),
            trained_at: Utc::now(),
            training_samples: 120,
        };
        assert_eq!(metadata.model_label(), "linear v0.1.0");
    }
}
