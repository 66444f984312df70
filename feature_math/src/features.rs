//! Feature construction for a single forecast day

use crate::calendar::calendar_features;
use crate::holidays::HolidayCalendar;
use crate::rolling;
use crate::schema::{FeatureSchema, LAG_OFFSETS, ROLLING_WINDOWS};
use crate::{FeatureError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

const EPSILON: f64 = 1e-12;

/// A named bag of feature values for one target date
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: HashMap<String, f64>,
}

impl FeatureRecord {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flatten into a vector following `schema`'s order.
    ///
    /// Errors on any schema name this record does not contain; a model must
    /// never be fed a vector with silently substituted positions.
    pub fn to_vector(&self, schema: &FeatureSchema) -> Result<Vec<f64>> {
        schema
            .names()
            .iter()
            .map(|name| {
                self.values
                    .get(name)
                    .copied()
                    .ok_or_else(|| FeatureError::MissingFeature(name.clone()))
            })
            .collect()
    }
}

/// Derives the feature record for a target date from bounded history buffers.
///
/// Buffers are most-recent-last: `prices[prices.len() - 1]` is the value for
/// the day immediately before `target`. Pure computation; the builder never
/// touches storage.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    holidays: HolidayCalendar,
}

impl FeatureBuilder {
    pub fn new(holidays: HolidayCalendar) -> Self {
        Self { holidays }
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Build the feature record for `target` from price and quantity buffers.
    ///
    /// The price buffer must be non-empty; the quantity buffer may be empty
    /// (products without sales history), in which case quantity features are
    /// zero.
    pub fn build(
        &self,
        target: NaiveDate,
        prices: &[f64],
        quantities: &[f64],
    ) -> Result<FeatureRecord> {
        if prices.is_empty() {
            return Err(FeatureError::InvalidInput(
                "Price buffer must not be empty".to_string(),
            ));
        }

        let mut values = HashMap::new();

        let calendar = calendar_features(target);
        values.insert("day_of_week".to_string(), f64::from(calendar.day_of_week));
        values.insert("day_of_month".to_string(), f64::from(calendar.day_of_month));
        values.insert("week_of_year".to_string(), f64::from(calendar.week_of_year));
        values.insert("month".to_string(), f64::from(calendar.month));
        values.insert("quarter".to_string(), f64::from(calendar.quarter));
        values.insert("is_weekend".to_string(), flag(calendar.is_weekend));
        values.insert("is_month_start".to_string(), flag(calendar.is_month_start));
        values.insert("is_month_end".to_string(), flag(calendar.is_month_end));

        values.insert(
            "is_holiday".to_string(),
            flag(self.holidays.is_holiday(target)),
        );
        values.insert(
            "days_to_holiday".to_string(),
            f64::from(self.holidays.days_to_next_holiday(target)),
        );
        values.insert(
            "days_since_holiday".to_string(),
            f64::from(self.holidays.days_since_last_holiday(target)),
        );

        for offset in LAG_OFFSETS {
            values.insert(format!("price_lag_{}", offset), lag(prices, offset));
            values.insert(format!("qty_lag_{}", offset), lag(quantities, offset));
        }

        for window in ROLLING_WINDOWS {
            values.insert(
                format!("price_mean_{}", window),
                rolling::rolling_mean(prices, window),
            );
            values.insert(
                format!("price_std_{}", window),
                rolling::rolling_std(prices, window),
            );
            values.insert(
                format!("price_min_{}", window),
                rolling::rolling_min(prices, window),
            );
            values.insert(
                format!("price_max_{}", window),
                rolling::rolling_max(prices, window),
            );
        }

        for window in ROLLING_WINDOWS {
            values.insert(
                format!("qty_mean_{}", window),
                rolling::rolling_mean(quantities, window),
            );
            values.insert(
                format!("qty_std_{}", window),
                rolling::rolling_std(quantities, window),
            );
            values.insert(
                format!("qty_sum_{}", window),
                rolling::rolling_sum(quantities, window),
            );
        }

        let last_price = prices[prices.len() - 1];
        let mean_7 = rolling::rolling_mean(prices, 7);
        let mean_30 = rolling::rolling_mean(prices, 30);
        let std_7 = rolling::rolling_std(prices, 7);

        values.insert("price_rel_mean_7".to_string(), safe_ratio(last_price, mean_7));
        values.insert(
            "price_rel_mean_30".to_string(),
            safe_ratio(last_price, mean_30),
        );
        values.insert("price_volatility_7".to_string(), safe_ratio(std_7, mean_7));

        Ok(FeatureRecord { values })
    }
}

/// Value `offset` days back from the buffer end.
///
/// A buffer shorter than the offset falls back to the oldest available
/// value. Stored models were trained against this exact behavior, so it is
/// kept even though it degrades short-history accuracy; see DESIGN.md.
fn lag(values: &[f64], offset: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if offset >= values.len() {
        return values[0];
    }
    values[values.len() - offset]
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() <= EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> FeatureBuilder {
        FeatureBuilder::new(HolidayCalendar::for_country("US").unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lag_indexing() {
        let values = [10.0, 20.0, 30.0];
        assert_eq!(lag(&values, 1), 30.0);
        assert_eq!(lag(&values, 2), 20.0);
        // Short buffer falls back to the oldest value
        assert_eq!(lag(&values, 7), 10.0);
        assert_eq!(lag(&[], 1), 0.0);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = builder();
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let quantities: Vec<f64> = (0..40).map(|i| 5.0 + (i % 3) as f64).collect();
        let target = date(2024, 6, 10);

        let a = builder.build(target, &prices, &quantities).unwrap();
        let b = builder.build(target, &prices, &quantities).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_covers_standard_schema() {
        let builder = builder();
        let prices = vec![100.0; 40];
        let quantities = vec![5.0; 40];
        let record = builder.build(date(2024, 6, 10), &prices, &quantities).unwrap();

        let schema = FeatureSchema::standard();
        let vector = record.to_vector(&schema).unwrap();
        assert_eq!(vector.len(), schema.len());
    }

    #[test]
    fn test_flat_series_derived_features() {
        let builder = builder();
        let prices = vec![50.0; 40];
        let record = builder.build(date(2024, 6, 10), &prices, &[]).unwrap();

        assert_eq!(record.get("price_lag_1"), Some(50.0));
        assert_eq!(record.get("price_rel_mean_7"), Some(1.0));
        assert_eq!(record.get("price_volatility_7"), Some(0.0));
        assert_eq!(record.get("qty_mean_7"), Some(0.0));
        assert_eq!(record.get("qty_lag_1"), Some(0.0));
    }

    #[test]
    fn test_empty_price_buffer_rejected() {
        let builder = builder();
        assert!(builder.build(date(2024, 6, 10), &[], &[]).is_err());
    }

    #[test]
    fn test_to_vector_rejects_unknown_names() {
        let builder = builder();
        let record = builder
            .build(date(2024, 6, 10), &[1.0, 2.0], &[])
            .unwrap();
        let schema = FeatureSchema::new(vec!["not_a_feature".to_string()]);
        assert!(matches!(
            record.to_vector(&schema),
            Err(FeatureError::MissingFeature(_))
        ));
    }
}
