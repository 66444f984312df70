//! Train a model on synthetic history and forecast two weeks ahead.
//!
//! Run with: cargo run --example train_and_forecast

use chrono::Utc;
use feature_math::{FeatureBuilder, HolidayCalendar};
use price_data::{synthetic_price_history, synthetic_sales_history, MemoryHistoryStore, SyntheticSeriesConfig};
use price_forecast::{
    train_price_model, ForecastSettings, ModelStore, PriceForecaster, TrainingConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sku = "SKU-1001";
    let as_of = Utc::now();

    // 120 days of plausible history
    let mut history = MemoryHistoryStore::new();
    let shape = SyntheticSeriesConfig::default();
    history.add_prices(synthetic_price_history(sku, 120, &shape, 42, as_of));
    history.add_sales(synthetic_sales_history(sku, 120, &shape, 43, as_of));

    let models_root = std::env::temp_dir().join("price_forecast_example_models");
    let models = ModelStore::new(&models_root);

    let builder = FeatureBuilder::new(HolidayCalendar::for_country("US")?);
    let report = train_price_model(&history, &models, &builder, sku, &TrainingConfig::default())?;
    println!(
        "Trained {} on {} samples\n{}",
        report.sku, report.samples, report.holdout
    );

    let settings = ForecastSettings {
        models_root,
        ..ForecastSettings::default()
    };
    let forecaster = PriceForecaster::new(&history, &models, settings)?;
    let forecast = forecaster.forecast(sku, 14)?;

    println!("Forecast ({}):", forecast.model_used);
    for (date, price) in forecast.dates.iter().zip(&forecast.prices) {
        println!("  {}  {:>8.2}", date, price);
    }

    Ok(())
}
