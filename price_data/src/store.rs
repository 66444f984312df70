//! Observation stores backing the history loader
//!
//! [`HistoryStore`] is the seam to the platform's relational storage. Two
//! implementations are provided: [`MemoryHistoryStore`] for tests and demos,
//! and [`CsvHistoryStore`] for file-backed setups (polars reads, append-only
//! csv writes).

use crate::error::{HistoryError, Result};
use crate::observations::{PriceObservation, Product, SalesObservation};
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Read access to price/sales observations and the product catalog.
///
/// Implementations return observations sorted ascending by collection time
/// (prices) or sale date (sales), restricted to the given window (inclusive).
pub trait HistoryStore {
    /// Look up a product by its SKU
    fn product_by_sku(&self, sku: &str) -> Result<Product>;

    /// Price observations for a SKU within `[from, to]`
    fn price_observations(
        &self,
        sku: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>>;

    /// Sales observations for a SKU within `[from, to]`
    fn sales_observations(
        &self,
        sku: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SalesObservation>>;
}

/// In-memory store for tests, demos and small backfills
#[derive(Debug, Default, Clone)]
pub struct MemoryHistoryStore {
    products: HashMap<String, Product>,
    prices: Vec<PriceObservation>,
    sales: Vec<SalesObservation>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product record
    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.sku.clone(), product);
    }

    /// Append a price observation
    pub fn add_price(&mut self, observation: PriceObservation) {
        self.prices.push(observation);
    }

    /// Append many price observations
    pub fn add_prices(&mut self, observations: impl IntoIterator<Item = PriceObservation>) {
        self.prices.extend(observations);
    }

    /// Append a sales observation
    pub fn add_sale(&mut self, observation: SalesObservation) {
        self.sales.push(observation);
    }

    /// Append many sales observations
    pub fn add_sales(&mut self, observations: impl IntoIterator<Item = SalesObservation>) {
        self.sales.extend(observations);
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn product_by_sku(&self, sku: &str) -> Result<Product> {
        self.products
            .get(sku)
            .cloned()
            .ok_or_else(|| HistoryError::UnknownProduct(sku.to_string()))
    }

    fn price_observations(
        &self,
        sku: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>> {
        let mut rows: Vec<PriceObservation> = self
            .prices
            .iter()
            .filter(|obs| obs.sku == sku && obs.collected_at >= from && obs.collected_at <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|obs| obs.collected_at);
        Ok(rows)
    }

    fn sales_observations(
        &self,
        sku: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SalesObservation>> {
        let mut rows: Vec<SalesObservation> = self
            .sales
            .iter()
            .filter(|obs| obs.sku == sku && obs.sale_date >= from && obs.sale_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|obs| obs.sale_date);
        Ok(rows)
    }
}

/// File-backed store keeping one CSV per observation kind under a directory
#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    dir: PathBuf,
}

impl CsvHistoryStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn prices_path(&self) -> PathBuf {
        self.dir.join("prices.csv")
    }

    fn sales_path(&self) -> PathBuf {
        self.dir.join("sales.csv")
    }

    fn products_path(&self) -> PathBuf {
        self.dir.join("products.csv")
    }

    /// Append price observations. Rows are never rewritten.
    pub fn append_prices(&self, rows: &[PriceObservation]) -> Result<()> {
        append_csv(&self.prices_path(), rows)
    }

    /// Append sales observations. Rows are never rewritten.
    pub fn append_sales(&self, rows: &[SalesObservation]) -> Result<()> {
        append_csv(&self.sales_path(), rows)
    }

    /// Replace the product catalog file
    pub fn write_products(&self, products: &[Product]) -> Result<()> {
        let mut writer = csv::Writer::from_path(self.products_path())?;
        for product in products {
            writer.serialize(product)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_prices(&self) -> Result<Vec<PriceObservation>> {
        let path = self.prices_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        // Use polars DataFrame reader directly
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let skus = column_as_str(&df, "sku")?;
        let prices = column_as_f64(&df, "price")?;
        let currencies = column_as_str(&df, "currency")?;
        let collected = column_as_str(&df, "collected_at")?;
        let suppliers = column_as_opt_str(&df, "supplier")?;
        let synthetic = column_as_bool(&df, "synthetic")?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let collected_at = DateTime::parse_from_rfc3339(&collected[i])
                .map_err(|e| {
                    HistoryError::DataError(format!(
                        "Bad timestamp '{}' in {}: {}",
                        collected[i],
                        path.display(),
                        e
                    ))
                })?
                .with_timezone(&Utc);
            rows.push(PriceObservation {
                sku: skus[i].clone(),
                price: prices[i],
                currency: currencies[i].clone(),
                collected_at,
                supplier: suppliers[i].clone(),
                synthetic: synthetic[i],
            });
        }
        debug!("Read {} price rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    fn read_sales(&self) -> Result<Vec<SalesObservation>> {
        let path = self.sales_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let skus = column_as_str(&df, "sku")?;
        let dates = column_as_str(&df, "sale_date")?;
        let quantities = column_as_f64(&df, "quantity")?;
        let revenues = column_as_f64(&df, "revenue")?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let sale_date = dates[i].parse::<NaiveDate>().map_err(|e| {
                HistoryError::DataError(format!(
                    "Bad sale date '{}' in {}: {}",
                    dates[i],
                    path.display(),
                    e
                ))
            })?;
            rows.push(SalesObservation {
                sku: skus[i].clone(),
                sale_date,
                quantity: quantities[i] as u32,
                revenue: revenues[i],
            });
        }
        Ok(rows)
    }
}

impl HistoryStore for CsvHistoryStore {
    fn product_by_sku(&self, sku: &str) -> Result<Product> {
        let path = self.products_path();
        if !path.exists() {
            return Err(HistoryError::UnknownProduct(sku.to_string()));
        }

        let mut reader = csv::Reader::from_path(&path)?;
        for row in reader.deserialize::<Product>() {
            let product = row?;
            if product.sku == sku {
                return Ok(product);
            }
        }
        Err(HistoryError::UnknownProduct(sku.to_string()))
    }

    fn price_observations(
        &self,
        sku: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>> {
        let mut rows: Vec<PriceObservation> = self
            .read_prices()?
            .into_iter()
            .filter(|obs| obs.sku == sku && obs.collected_at >= from && obs.collected_at <= to)
            .collect();
        rows.sort_by_key(|obs| obs.collected_at);
        Ok(rows)
    }

    fn sales_observations(
        &self,
        sku: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SalesObservation>> {
        let mut rows: Vec<SalesObservation> = self
            .read_sales()?
            .into_iter()
            .filter(|obs| obs.sku == sku && obs.sale_date >= from && obs.sale_date <= to)
            .collect();
        rows.sort_by_key(|obs| obs.sale_date);
        Ok(rows)
    }
}

fn append_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let write_header = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Helper to get a column as f64 values
fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let col = df
        .column(name)
        .map_err(|e| HistoryError::DataError(format!("Column '{}' not found: {}", name, e)))?;

    let values: Vec<Option<f64>> = match col.dtype() {
        DataType::Float64 => col.f64()?.into_iter().collect(),
        DataType::Float32 => col.f32()?.into_iter().map(|v| v.map(f64::from)).collect(),
        DataType::Int64 => col.i64()?.into_iter().map(|v| v.map(|v| v as f64)).collect(),
        DataType::Int32 => col.i32()?.into_iter().map(|v| v.map(f64::from)).collect(),
        _ => {
            return Err(HistoryError::DataError(format!(
                "Column '{}' cannot be read as f64",
                name
            )))
        }
    };

    values
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| HistoryError::DataError(format!("Null value in column '{}'", name)))
        })
        .collect()
}

/// Helper to get a column as non-null strings
fn column_as_str(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    column_as_opt_str(df, name)?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| HistoryError::DataError(format!("Null value in column '{}'", name)))
        })
        .collect()
}

/// Helper to get a column as optional strings (empty CSV fields become None)
fn column_as_opt_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(name)
        .map_err(|e| HistoryError::DataError(format!("Column '{}' not found: {}", name, e)))?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect()),
        _ => Err(HistoryError::DataError(format!(
            "Column '{}' cannot be read as string",
            name
        ))),
    }
}

/// Helper to get a column as booleans
fn column_as_bool(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    let col = df
        .column(name)
        .map_err(|e| HistoryError::DataError(format!("Column '{}' not found: {}", name, e)))?;

    match col.dtype() {
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    HistoryError::DataError(format!("Null value in column '{}'", name))
                })
            })
            .collect(),
        DataType::Utf8 => col
            .utf8()?
            .into_iter()
            .map(|v| match v {
                Some("true") | Some("True") => Ok(true),
                Some("false") | Some("False") => Ok(false),
                other => Err(HistoryError::DataError(format!(
                    "Column '{}' has non-boolean value {:?}",
                    name, other
                ))),
            })
            .collect(),
        _ => Err(HistoryError::DataError(format!(
            "Column '{}' cannot be read as bool",
            name
        ))),
    }
}
