use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, Utc};
use feature_math::FeatureSchema;
use price_data::{HistoryError, MemoryHistoryStore, PriceObservation};
use price_forecast::{
    ForecastError, ForecastSettings, LinearRegressor, ModelMetadata, ModelStore, PriceForecaster,
    Regressor, FALLBACK_MODEL_NAME,
};
use std::collections::BTreeMap;
use tempfile::TempDir;

/// One observation per day, the most recent yesterday
fn history_with_prices(sku: &str, prices: &[f64]) -> MemoryHistoryStore {
    let mut store = MemoryHistoryStore::new();
    let days = prices.len() as i64;
    for (i, &price) in prices.iter().enumerate() {
        let collected_at = Utc::now() - Duration::days(days - i as i64);
        store.add_price(PriceObservation::new(sku, price, collected_at));
    }
    store
}

/// A model that predicts `price_lag_1 * factor`, with no scaler
fn lag1_model(factor: f64) -> (Regressor, ModelMetadata) {
    let schema = FeatureSchema::standard();
    let mut weights = vec![0.0; schema.len()];
    weights[schema.index_of("price_lag_1").unwrap()] = factor;

    let metadata = ModelMetadata {
        model_type: "linear".to_string(),
        version: "1.0.0".to_string(),
        features: schema,
        hyperparameters: BTreeMap::new(),
        metrics: BTreeMap::from([("mae".to_string(), 0.5)]),
        trained_at: Utc::now(),
        training_samples: 60,
    };
    (Regressor::Linear(LinearRegressor::new(weights, 0.0)), metadata)
}

fn settings_for(dir: &TempDir) -> ForecastSettings {
    ForecastSettings {
        models_root: dir.path().to_path_buf(),
        ..ForecastSettings::default()
    }
}

#[test]
fn test_horizon_cardinality_and_contiguous_dates() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());
    let (regressor, metadata) = lag1_model(1.01);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let forecast = forecaster.forecast("SKU-1", 5).unwrap();

    assert_eq!(forecast.dates.len(), 5);
    assert_eq!(forecast.prices.len(), 5);

    // Starts the day after the last real observation
    let last_real = (Utc::now() - Duration::days(1)).date_naive();
    assert_eq!(forecast.dates[0], last_real + Duration::days(1));
    for pair in forecast.dates.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
}

#[test]
fn test_compounding_lag1_scenario() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());
    let (regressor, metadata) = lag1_model(1.01);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let forecast = forecaster.forecast("SKU-1", 3).unwrap();

    // Each day compounds on the previous day's prediction
    assert_eq!(forecast.prices, vec![101.0, 102.01, 103.03]);
    assert_eq!(forecast.model_used, "linear v1.0.0");
    assert_eq!(forecast.metrics.get("mae"), Some(&0.5));
}

#[test]
fn test_autoregressive_propagation() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());
    let (regressor, metadata) = lag1_model(1.01);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let forecast = forecaster.forecast("SKU-1", 4).unwrap();

    // Ratio between consecutive days equals the lag-1 factor: each step
    // consumed the previous step's prediction, not ground truth
    for pair in forecast.prices.windows(2) {
        assert_approx_eq!(pair[1] / pair[0], 1.01, 1e-4);
    }
}

#[test]
fn test_predictions_clamped_non_negative() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());

    // Strongly negative model output on every step
    let schema = FeatureSchema::standard();
    let regressor = Regressor::Linear(LinearRegressor::new(vec![0.0; schema.len()], -50.0));
    let metadata = ModelMetadata {
        model_type: "linear".to_string(),
        version: "1.0.0".to_string(),
        features: schema,
        hyperparameters: BTreeMap::new(),
        metrics: BTreeMap::new(),
        trained_at: Utc::now(),
        training_samples: 60,
    };
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let forecast = forecaster.forecast("SKU-1", 5).unwrap();
    assert!(forecast.prices.iter().all(|&p| p == 0.0));
}

#[test]
fn test_invalid_horizon_rejected() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    assert!(matches!(
        forecaster.forecast("SKU-1", 0),
        Err(ForecastError::InvalidHorizon(0))
    ));
}

#[test]
fn test_fallback_flat_line() {
    let dir = TempDir::new().unwrap();
    // 20 days of history, newest = 101.0, oldest = 120.0; no trained model
    let prices: Vec<f64> = (1..=20).rev().map(|k| 100.0 + f64::from(k)).collect();
    let history = history_with_prices("SKU-1", &prices);
    let models = ModelStore::new(dir.path());

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let forecast = forecaster.forecast("SKU-1", 6).unwrap();

    assert_eq!(forecast.model_used, FALLBACK_MODEL_NAME);
    assert!(forecast.metrics.is_empty());
    assert_eq!(forecast.dates.len(), 6);

    // Mean of the most recent 14 real prices: 101..=114 -> 107.5
    assert_eq!(forecast.prices, vec![107.5; 6]);
}

#[test]
fn test_insufficient_history_gates_both_paths() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 10]);
    let models = ModelStore::new(dir.path());

    // Fallback path: no model, 10 observations < 14 required
    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    assert!(matches!(
        forecaster.forecast("SKU-1", 3),
        Err(ForecastError::History(
            HistoryError::InsufficientHistory { .. }
        ))
    ));

    // Trained-model path: 10 observations < 30 required
    let (regressor, metadata) = lag1_model(1.01);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();
    assert!(matches!(
        forecaster.forecast("SKU-1", 3),
        Err(ForecastError::History(
            HistoryError::InsufficientHistory { .. }
        ))
    ));
}

#[test]
fn test_corrupt_model_does_not_fall_back() {
    let dir = TempDir::new().unwrap();
    let history = history_with_prices("SKU-1", &vec![100.0; 60]);
    let models = ModelStore::new(dir.path());
    let (regressor, metadata) = lag1_model(1.01);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    std::fs::write(dir.path().join("SKU-1").join("model.json"), "{broken").unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    assert!(matches!(
        forecaster.forecast("SKU-1", 3),
        Err(ForecastError::CorruptArtifact { .. })
    ));
}

#[test]
fn test_forecast_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i % 5) as f64).collect();
    let history = history_with_prices("SKU-1", &prices);
    let models = ModelStore::new(dir.path());
    let (regressor, metadata) = lag1_model(0.99);
    models.save("SKU-1", &regressor, None, &metadata).unwrap();

    let forecaster = PriceForecaster::new(&history, &models, settings_for(&dir)).unwrap();
    let a = forecaster.forecast("SKU-1", 10).unwrap();
    let b = forecaster.forecast("SKU-1", 10).unwrap();
    assert_eq!(a, b);
}
