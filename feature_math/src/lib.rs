//! # Feature Math
//!
//! Pure feature computation for daily price forecasting. Given a target date
//! and bounded history buffers, this crate derives the calendar, holiday,
//! lag, rolling-window and ratio features a trained regressor consumes.
//!
//! Everything here is deterministic and free of I/O: the same inputs always
//! produce the same feature record.

use thiserror::Error;

pub mod calendar;
pub mod features;
pub mod holidays;
pub mod rolling;
pub mod schema;

/// Errors that can occur during feature computation
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Missing feature: {0}")]
    MissingFeature(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported holiday country: {0}")]
    UnsupportedCountry(String),
}

/// Result type for feature operations
pub type Result<T> = std::result::Result<T, FeatureError>;

pub use crate::calendar::{calendar_features, CalendarFeatures};
pub use crate::features::{FeatureBuilder, FeatureRecord};
pub use crate::holidays::HolidayCalendar;
pub use crate::schema::FeatureSchema;
