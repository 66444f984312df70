//! Error types for the price_data crate

use thiserror::Error;

/// Custom error types for the price_data crate
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Fewer raw observations than the caller requires for a reliable series
    #[error("Insufficient history for {sku}: {observed} observations, {required} required")]
    InsufficientHistory {
        sku: String,
        observed: usize,
        required: usize,
    },

    /// SKU has no product record in the store
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, HistoryError>;

impl From<polars::prelude::PolarsError> for HistoryError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        HistoryError::PolarsError(err.to_string())
    }
}
