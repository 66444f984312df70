//! End-to-end walkthrough: synthetic history, training, forecasting and
//! the fallback path for an untrained SKU.
//!
//! Run with: cargo run --example forecast_product

use chrono::Utc;
use pricecast::feature_math::{FeatureBuilder, HolidayCalendar};
use pricecast::price_data::{
    synthetic_price_history, synthetic_sales_history, MemoryHistoryStore, Product,
    SyntheticSeriesConfig,
};
use pricecast::price_forecast::{
    train_price_model, ForecastSettings, ModelStore, PriceForecaster, TrainingConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let as_of = Utc::now();
    let mut history = MemoryHistoryStore::new();

    // One SKU with enough history to train, one with only a short tail
    let shape = SyntheticSeriesConfig::default();
    history.add_product(Product::new(1, "SKU-1001", "Espresso beans 1kg", "coffee"));
    history.add_prices(synthetic_price_history("SKU-1001", 180, &shape, 11, as_of));
    history.add_sales(synthetic_sales_history("SKU-1001", 180, &shape, 12, as_of));

    history.add_product(Product::new(2, "SKU-2002", "Paper cups 250ml", "supplies"));
    history.add_prices(synthetic_price_history("SKU-2002", 20, &shape, 13, as_of));

    let settings = ForecastSettings {
        models_root: std::env::temp_dir().join("pricecast_demo_models"),
        ..ForecastSettings::default()
    };
    let models = ModelStore::new(&settings.models_root);

    let builder = FeatureBuilder::new(HolidayCalendar::for_country(&settings.holiday_country)?);
    let report = train_price_model(
        &history,
        &models,
        &builder,
        "SKU-1001",
        &TrainingConfig::default(),
    )?;
    println!("Trained {} ({} samples)", report.sku, report.samples);

    let forecaster = PriceForecaster::new(&history, &models, settings)?;

    for sku in ["SKU-1001", "SKU-2002"] {
        let forecast = forecaster.forecast(sku, 7)?;
        println!("\n{} via {}:", forecast.sku, forecast.model_used);
        for (date, price) in forecast.dates.iter().zip(&forecast.prices) {
            println!("  {}  {:>8.2}", date, price);
        }
    }

    println!("\nTrained models on disk: {:?}", models.list_trained()?);
    Ok(())
}
