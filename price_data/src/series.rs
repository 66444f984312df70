//! Daily series regularization for forecasting
//!
//! Raw price observations arrive at irregular times: several per day for
//! actively scraped products, none at all for quiet stretches. Forecasting
//! needs one value per calendar day with no holes, so the loader collapses
//! duplicates, reindexes to the full daily range and interpolates gaps.

use crate::error::{HistoryError, Result};
use crate::store::HistoryStore;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

/// A contiguous daily time series of prices and sold quantities for one SKU
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub sku: String,
    /// Consecutive calendar days, ascending
    pub dates: Vec<NaiveDate>,
    /// One price per day, same length as `dates`
    pub prices: Vec<f64>,
    /// Units sold per day, same length as `dates`; zero where no sales exist
    pub quantities: Vec<f64>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The last day with a real observation
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Mean of the most recent `window` prices (whole series when shorter)
    pub fn tail_mean(&self, window: usize) -> Option<f64> {
        if self.prices.is_empty() || window == 0 {
            return None;
        }
        let start = self.prices.len().saturating_sub(window);
        let tail = &self.prices[start..];
        Some(tail.iter().sum::<f64>() / tail.len() as f64)
    }
}

/// Load a continuous daily price series for `sku` looking back from now.
///
/// Fails with [`HistoryError::InsufficientHistory`] when fewer than
/// `min_observations` raw price rows exist in the window.
pub fn daily_price_series<S: HistoryStore>(
    store: &S,
    sku: &str,
    lookback_days: u32,
    min_observations: usize,
) -> Result<DailySeries> {
    daily_price_series_as_of(store, sku, lookback_days, min_observations, Utc::now())
}

/// Load a continuous daily price series with an explicit window end.
///
/// Same-day duplicates are averaged, the series is reindexed to the full
/// daily range between the first and last observed day, interior gaps are
/// filled by time-weighted linear interpolation, and edge gaps by
/// forward/backward fill. Read-only; the store is never written.
pub fn daily_price_series_as_of<S: HistoryStore>(
    store: &S,
    sku: &str,
    lookback_days: u32,
    min_observations: usize,
    as_of: DateTime<Utc>,
) -> Result<DailySeries> {
    let from = as_of - Duration::days(i64::from(lookback_days));
    let observations = store.price_observations(sku, from, as_of)?;

    if observations.len() < min_observations {
        return Err(HistoryError::InsufficientHistory {
            sku: sku.to_string(),
            observed: observations.len(),
            required: min_observations,
        });
    }

    // Collapse to one mean price per UTC calendar day
    let mut per_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for obs in &observations {
        let entry = per_day.entry(obs.collected_at.date_naive()).or_insert((0.0, 0));
        entry.0 += obs.price;
        entry.1 += 1;
    }

    let first_day = *per_day
        .keys()
        .next()
        .ok_or_else(|| HistoryError::DataError(format!("No observation dates for {}", sku)))?;
    let last_day = *per_day
        .keys()
        .next_back()
        .ok_or_else(|| HistoryError::DataError(format!("No observation dates for {}", sku)))?;

    // Reindex to the full daily range
    let mut dates = Vec::new();
    let mut values: Vec<Option<f64>> = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        dates.push(day);
        values.push(per_day.get(&day).map(|(sum, count)| sum / *count as f64));
        day = day + Duration::days(1);
    }

    interpolate_gaps(&mut values);

    let prices: Vec<f64> = values
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| HistoryError::DataError(format!("Unfilled gap in series for {}", sku)))
        })
        .collect::<Result<_>>()?;

    let quantities = daily_quantities(store, sku, &dates)?;

    Ok(DailySeries {
        sku: sku.to_string(),
        dates,
        prices,
        quantities,
    })
}

/// Units sold per day over `dates`, summing same-day sales rows
fn daily_quantities<S: HistoryStore>(
    store: &S,
    sku: &str,
    dates: &[NaiveDate],
) -> Result<Vec<f64>> {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Ok(Vec::new());
    };

    let sales = store.sales_observations(sku, *first, *last)?;
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sale in &sales {
        *per_day.entry(sale.sale_date).or_insert(0.0) += f64::from(sale.quantity);
    }

    Ok(dates
        .iter()
        .map(|date| per_day.get(date).copied().unwrap_or(0.0))
        .collect())
}

/// Fill interior gaps by linear interpolation weighted by day distance,
/// then forward/backward-fill the edges.
fn interpolate_gaps(values: &mut [Option<f64>]) {
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return;
    };

    for pair in known.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        if j <= i + 1 {
            continue;
        }
        let (Some(vi), Some(vj)) = (values[i], values[j]) else {
            continue;
        };
        let span = (j - i) as f64;
        for k in (i + 1)..j {
            let weight = (k - i) as f64 / span;
            values[k] = Some(vi + (vj - vi) * weight);
        }
    }

    for k in 0..first {
        values[k] = values[first];
    }
    for k in (last + 1)..values.len() {
        values[k] = values[last];
    }
}
