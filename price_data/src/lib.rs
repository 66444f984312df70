//! # Price Data
//!
//! Observation storage and daily series regularization for SKU price
//! forecasting.
//!
//! ## Features
//!
//! - Product catalog and append-only observation types (price, sales)
//! - Pluggable history stores (in-memory, CSV-file backed)
//! - Daily series loading: duplicate aggregation, reindexing to a full
//!   daily range and gap interpolation
//! - Synthetic observation generation for development and backfill
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use price_data::{daily_price_series, MemoryHistoryStore, PriceObservation};
//!
//! let mut store = MemoryHistoryStore::new();
//! for day in 0..40 {
//!     let at = Utc::now() - chrono::Duration::days(40 - day);
//!     store.add_price(PriceObservation::new("SKU-1001", 100.0 + day as f64, at));
//! }
//!
//! let series = daily_price_series(&store, "SKU-1001", 365, 30).unwrap();
//! assert!(series.len() >= 30);
//! ```

pub mod error;
pub mod observations;
pub mod series;
pub mod store;
pub mod synthetic;

// Re-export commonly used types
pub use crate::error::{HistoryError, Result};
pub use crate::observations::{round_price, PriceObservation, Product, SalesObservation};
pub use crate::series::{daily_price_series, daily_price_series_as_of, DailySeries};
pub use crate::store::{CsvHistoryStore, HistoryStore, MemoryHistoryStore};
pub use crate::synthetic::{synthetic_price_history, synthetic_sales_history, SyntheticSeriesConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
