//! Ordered feature schema shared by training and prediction
//!
//! A regressor's inputs are positional: the vector handed to it at
//! prediction time must list features in exactly the order used at training
//! time. The schema makes that ordering an explicit value that is persisted
//! with the model and checked when the model is loaded, instead of a
//! convention both code paths have to repeat correctly.

use serde::{Deserialize, Serialize};

/// Lag offsets, in days, applied to both price and quantity buffers
pub const LAG_OFFSETS: [usize; 5] = [1, 2, 7, 14, 30];

/// Rolling-window lengths, in days
pub const ROLLING_WINDOWS: [usize; 3] = [7, 14, 30];

/// An ordered, named list of model input features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// The canonical schema produced by
    /// [`FeatureBuilder`](crate::FeatureBuilder): calendar, holiday, lag,
    /// rolling and derived features, in that order.
    pub fn standard() -> Self {
        let mut names: Vec<String> = vec![
            "day_of_week".to_string(),
            "day_of_month".to_string(),
            "week_of_year".to_string(),
            "month".to_string(),
            "quarter".to_string(),
            "is_weekend".to_string(),
            "is_month_start".to_string(),
            "is_month_end".to_string(),
            "is_holiday".to_string(),
            "days_to_holiday".to_string(),
            "days_since_holiday".to_string(),
        ];

        for offset in LAG_OFFSETS {
            names.push(format!("price_lag_{}", offset));
        }
        for offset in LAG_OFFSETS {
            names.push(format!("qty_lag_{}", offset));
        }
        for window in ROLLING_WINDOWS {
            names.push(format!("price_mean_{}", window));
            names.push(format!("price_std_{}", window));
            names.push(format!("price_min_{}", window));
            names.push(format!("price_max_{}", window));
        }
        for window in ROLLING_WINDOWS {
            names.push(format!("qty_mean_{}", window));
            names.push(format!("qty_std_{}", window));
            names.push(format!("qty_sum_{}", window));
        }

        names.push("price_rel_mean_7".to_string());
        names.push("price_rel_mean_30".to_string());
        names.push("price_volatility_7".to_string());

        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a feature name, if present
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
