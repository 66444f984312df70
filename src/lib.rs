//! # Pricecast
//!
//! `pricecast` is the umbrella crate for the SKU price forecasting workspace.
//! It re-exports the member crates so applications can depend on a single
//! package:
//!
//! - [`price_data`]: observation types, history stores and daily series
//!   regularization
//! - [`feature_math`]: calendar, holiday, lag and rolling-window feature
//!   computation
//! - [`price_forecast`]: model persistence, training and the autoregressive
//!   price forecaster
//!
//! ## Example
//!
//! ```no_run
//! use pricecast::price_data::MemoryHistoryStore;
//! use pricecast::price_forecast::{ForecastSettings, ModelStore, PriceForecaster};
//!
//! let history = MemoryHistoryStore::new();
//! let settings = ForecastSettings::default();
//! let models = ModelStore::new(&settings.models_root);
//! let forecaster = PriceForecaster::new(&history, &models, settings).unwrap();
//! let forecast = forecaster.forecast("SKU-1001", 14).unwrap();
//! println!("{} days forecast for {}", forecast.prices.len(), forecast.sku);
//! ```

pub use feature_math;
pub use price_data;
pub use price_forecast;

/// Workspace version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
