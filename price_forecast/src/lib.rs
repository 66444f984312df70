//! # Price Forecast
//!
//! Per-SKU model persistence and autoregressive daily price forecasting.
//!
//! ## Features
//!
//! - Serializable regressors: ridge-fitted linear models and
//!   gradient-boosted tree ensembles importable from LightGBM model text
//! - Model artifact store: per-SKU (model, optional scaler, metadata)
//!   triples with a registry index
//! - Autoregressive forecasting: each day's prediction feeds the next
//!   day's lag and rolling features
//! - Moving-average fallback for SKUs without a trained model
//! - Training with chronological holdout evaluation
//!
//! ## Quick Start
//!
//! ```no_run
//! use price_data::MemoryHistoryStore;
//! use price_forecast::{ForecastSettings, ModelStore, PriceForecaster};
//!
//! let history = MemoryHistoryStore::new();
//! let settings = ForecastSettings::default();
//! let models = ModelStore::new(&settings.models_root);
//!
//! let forecaster = PriceForecaster::new(&history, &models, settings)?;
//! let forecast = forecaster.forecast("SKU-1001", 14)?;
//! for (date, price) in forecast.dates.iter().zip(&forecast.prices) {
//!     println!("{}: {:.2}", date, price);
//! }
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod error;
pub mod forecaster;
pub mod gbdt;
pub mod metadata;
pub mod metrics;
pub mod regressor;
pub mod scaler;
pub mod settings;
pub mod store;
pub mod training;

// Re-export commonly used types
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{
    predict_prices_for_product, PriceForecast, PriceForecaster, FALLBACK_MODEL_NAME,
};
pub use crate::gbdt::GbdtRegressor;
pub use crate::metadata::ModelMetadata;
pub use crate::metrics::{forecast_accuracy, ForecastAccuracy};
pub use crate::regressor::{LinearRegressor, Regressor};
pub use crate::scaler::StandardScaler;
pub use crate::settings::ForecastSettings;
pub use crate::store::{LoadedModel, ModelStore, RegistryEntry};
pub use crate::training::{
    import_lightgbm_model, train_price_model, TrainingConfig, TrainingReport,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
