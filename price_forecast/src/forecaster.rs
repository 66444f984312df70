//! Autoregressive price forecasting
//!
//! Forecasting walks forward one day at a time: each step builds features
//! from a sliding buffer seeded with real history, asks the stored model
//! for the next price, and pushes that prediction back into the buffer so
//! the following step's lag and rolling features see it. The loop is
//! deliberately sequential: step i+1 depends on step i's output, so there
//! is nothing to parallelize inside one forecast.

use crate::error::{ForecastError, Result};
use crate::settings::ForecastSettings;
use crate::store::{LoadedModel, ModelStore};
use chrono::{Duration, NaiveDate};
use feature_math::rolling;
use feature_math::{FeatureBuilder, HolidayCalendar};
use log::{debug, info};
use price_data::{daily_price_series, round_price, DailySeries, HistoryStore};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Model label reported when the moving-average fallback produced the result
pub const FALLBACK_MODEL_NAME: &str = "moving_average_fallback";

/// A completed forecast for one SKU
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceForecast {
    pub sku: String,
    /// Consecutive days starting the day after the last real observation
    pub dates: Vec<NaiveDate>,
    /// Predicted prices, non-negative, rounded to two decimals
    pub prices: Vec<f64>,
    /// Label of the model that produced the forecast
    pub model_used: String,
    /// Holdout metrics of that model; empty for the fallback
    pub metrics: BTreeMap<String, f64>,
}

/// Forecasts daily prices for SKUs from stored models and observation history
pub struct PriceForecaster<'a, S: HistoryStore> {
    history: &'a S,
    models: &'a ModelStore,
    builder: FeatureBuilder,
    settings: ForecastSettings,
}

impl<'a, S: HistoryStore> PriceForecaster<'a, S> {
    pub fn new(history: &'a S, models: &'a ModelStore, settings: ForecastSettings) -> Result<Self> {
        let holidays = HolidayCalendar::for_country(&settings.holiday_country)?;
        Ok(Self {
            history,
            models,
            builder: FeatureBuilder::new(holidays),
            settings,
        })
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Forecast `horizon_days` consecutive daily prices for `sku`.
    ///
    /// Uses the stored model when a complete artifact triple exists,
    /// otherwise the moving-average fallback. A corrupt or schema-mismatched
    /// artifact propagates its error instead of falling back, so operators
    /// can tell the two states apart.
    pub fn forecast(&self, sku: &str, horizon_days: u32) -> Result<PriceForecast> {
        if horizon_days == 0 {
            return Err(ForecastError::InvalidHorizon(horizon_days));
        }

        if !self.models.exists(sku) {
            info!(
                "No trained model for {}; using moving-average fallback",
                sku
            );
            return self.fallback_forecast(sku, horizon_days);
        }

        let loaded = self.models.load(sku)?;
        let series = daily_price_series(
            self.history,
            sku,
            self.settings.lookback_days,
            self.settings.min_model_observations,
        )?;

        self.model_forecast(sku, horizon_days, &series, &loaded)
    }

    /// Flat-line forecast at the mean of the most recent real prices.
    ///
    /// Requires at least `min_fallback_observations` raw price rows; a SKU
    /// with no usable history fails rather than returning zeros.
    pub fn fallback_forecast(&self, sku: &str, horizon_days: u32) -> Result<PriceForecast> {
        if horizon_days == 0 {
            return Err(ForecastError::InvalidHorizon(horizon_days));
        }

        let series = daily_price_series(
            self.history,
            sku,
            self.settings.lookback_days,
            self.settings.min_fallback_observations.max(1),
        )?;

        let last_date = series.last_date().ok_or_else(|| empty_series(sku))?;
        let mean = series
            .tail_mean(self.settings.fallback_window)
            .ok_or_else(|| empty_series(sku))?;
        let flat_price = round_price(mean);

        let mut dates = Vec::with_capacity(horizon_days as usize);
        for step in 1..=i64::from(horizon_days) {
            dates.push(last_date + Duration::days(step));
        }

        Ok(PriceForecast {
            sku: sku.to_string(),
            dates,
            prices: vec![flat_price; horizon_days as usize],
            model_used: FALLBACK_MODEL_NAME.to_string(),
            metrics: BTreeMap::new(),
        })
    }

    fn model_forecast(
        &self,
        sku: &str,
        horizon_days: u32,
        series: &DailySeries,
        loaded: &LoadedModel,
    ) -> Result<PriceForecast> {
        let last_date = series.last_date().ok_or_else(|| empty_series(sku))?;

        let capacity = self.settings.buffer_capacity.max(1);
        let mut price_buffer = seed_buffer(&series.prices, capacity);
        let mut qty_buffer = seed_buffer(&series.quantities, capacity);

        let mut dates = Vec::with_capacity(horizon_days as usize);
        let mut prices = Vec::with_capacity(horizon_days as usize);

        for step in 1..=i64::from(horizon_days) {
            let target = last_date + Duration::days(step);

            let price_history: Vec<f64> = price_buffer.iter().copied().collect();
            let qty_history: Vec<f64> = qty_buffer.iter().copied().collect();

            let record = self.builder.build(target, &price_history, &qty_history)?;
            let mut vector = record.to_vector(&loaded.metadata.features)?;
            if let Some(scaler) = &loaded.scaler {
                vector = scaler.transform(&vector)?;
            }

            let predicted = loaded.regressor.predict(&vector)?.max(0.0);
            debug!("{} {} -> {:.4}", sku, target, predicted);

            // The prediction becomes history for the next step
            push_bounded(&mut price_buffer, predicted, capacity);

            // Quantity has no trained model; estimate it as the mean of the
            // most recent buffer entries
            let qty_estimate = rolling::rolling_mean(&qty_history, self.settings.quantity_window);
            push_bounded(&mut qty_buffer, qty_estimate, capacity);

            dates.push(target);
            prices.push(round_price(predicted));
        }

        Ok(PriceForecast {
            sku: sku.to_string(),
            dates,
            prices,
            model_used: loaded.metadata.model_label(),
            metrics: loaded.metadata.metrics.clone(),
        })
    }
}

/// One-call forecast entry point for web routes and job workers
pub fn predict_prices_for_product<S: HistoryStore>(
    history: &S,
    models: &ModelStore,
    settings: ForecastSettings,
    sku: &str,
    days_ahead: u32,
) -> Result<PriceForecast> {
    PriceForecaster::new(history, models, settings)?.forecast(sku, days_ahead)
}

fn empty_series(sku: &str) -> ForecastError {
    ForecastError::History(price_data::HistoryError::DataError(format!(
        "Empty daily series for {}",
        sku
    )))
}

fn seed_buffer(values: &[f64], capacity: usize) -> VecDeque<f64> {
    let start = values.len().saturating_sub(capacity);
    values[start..].iter().copied().collect()
}

fn push_bounded(buffer: &mut VecDeque<f64>, value: f64, capacity: usize) {
    buffer.push_back(value);
    if buffer.len() > capacity {
        buffer.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_buffer_caps_length() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let buffer = seed_buffer(&values, 60);
        assert_eq!(buffer.len(), 60);
        assert_eq!(buffer.front(), Some(&40.0));
        assert_eq!(buffer.back(), Some(&99.0));
    }

    #[test]
    fn test_push_bounded_evicts_oldest() {
        let mut buffer: VecDeque<f64> = (0..3).map(|i| i as f64).collect();
        push_bounded(&mut buffer, 3.0, 3);
        assert_eq!(buffer, VecDeque::from([1.0, 2.0, 3.0]));
    }
}
