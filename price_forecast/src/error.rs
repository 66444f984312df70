//! Error types for the price_forecast crate

use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Caller asked for a zero-day forecast; never clamped
    #[error("Forecast horizon must be at least 1 day, got {0}")]
    InvalidHorizon(u32),

    /// No complete model artifact triple exists for the SKU
    #[error("No trained model for {0}")]
    ModelNotFound(String),

    /// An artifact file exists but cannot be deserialized. Distinct from
    /// [`ForecastError::ModelNotFound`] so operators can tell "never
    /// trained" from "artifact damaged".
    #[error("Corrupt model artifact for {sku} at {path}: {detail}")]
    CorruptArtifact {
        sku: String,
        path: PathBuf,
        detail: String,
    },

    /// Recorded feature schema disagrees with the regressor or scaler shape
    #[error("Feature schema mismatch for {sku}: {detail}")]
    SchemaMismatch { sku: String, detail: String },

    /// Feature vector length does not match the model input size
    #[error("Feature vector length {got} does not match model input {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Malformed model text during import
    #[error("Model parse error: {0}")]
    ModelParseError(String),

    /// Error during model fitting
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Error from history loading
    #[error("History error: {0}")]
    History(#[from] price_data::HistoryError),

    /// Error from feature computation
    #[error("Feature error: {0}")]
    Feature(#[from] feature_math::FeatureError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON serialization
    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Whether the caller may switch to the moving-average fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::ModelNotFound(_)
                | ForecastError::History(price_data::HistoryError::InsufficientHistory { .. })
        )
    }
}
