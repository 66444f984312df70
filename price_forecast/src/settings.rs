//! Runtime settings for the forecasting service

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunables for history loading and forecasting.
///
/// Defaults match the platform's production values; deployments override
/// them via a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Root directory for model artifacts
    pub models_root: PathBuf,
    /// How far back to read observations
    pub lookback_days: u32,
    /// Sliding-window capacity of the forecast buffers
    pub buffer_capacity: usize,
    /// Raw observations required for the trained-model path
    pub min_model_observations: usize,
    /// Raw observations required for the moving-average fallback
    pub min_fallback_observations: usize,
    /// Window for the fallback mean and the quantity estimate
    pub fallback_window: usize,
    /// Buffer entries averaged to estimate the next day's quantity
    pub quantity_window: usize,
    /// ISO country code for the holiday calendar
    pub holiday_country: String,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            models_root: PathBuf::from("models"),
            lookback_days: 365,
            buffer_capacity: 60,
            min_model_observations: 30,
            min_fallback_observations: 14,
            fallback_window: 14,
            quantity_window: 7,
            holiday_country: "US".to_string(),
        }
    }
}

impl ForecastSettings {
    /// Load settings from a JSON file; absent keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
