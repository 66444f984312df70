//! Product catalog and append-only observation types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A product tracked by the purchasing platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    /// Unique business key
    pub sku: String,
    pub name: String,
    pub category: String,
    pub current_stock: u32,
    pub min_stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product with stock counters at zero
    pub fn new(id: u64, sku: &str, name: &str, category: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            sku: sku.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            current_stock: 0,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether stock has fallen to or below the reorder threshold
    pub fn needs_restock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

/// A single collected price point. Rows are append-only and never mutated
/// once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub sku: String,
    /// Observed price, rounded to two decimals
    pub price: f64,
    /// ISO 4217 currency code
    pub currency: String,
    pub collected_at: DateTime<Utc>,
    /// Supplier the price was collected from, when known
    pub supplier: Option<String>,
    /// Whether this row was generated rather than scraped
    pub synthetic: bool,
}

impl PriceObservation {
    /// Create a scraped (non-synthetic) observation in EUR
    pub fn new(sku: &str, price: f64, collected_at: DateTime<Utc>) -> Self {
        Self {
            sku: sku.to_string(),
            price: round_price(price),
            currency: "EUR".to_string(),
            collected_at,
            supplier: None,
            synthetic: false,
        }
    }

    /// Attach a supplier label
    pub fn with_supplier(mut self, supplier: &str) -> Self {
        self.supplier = Some(supplier.to_string());
        self
    }
}

/// Daily sales record for a product. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub sku: String,
    pub sale_date: NaiveDate,
    pub quantity: u32,
    pub revenue: f64,
}

impl SalesObservation {
    pub fn new(sku: &str, sale_date: NaiveDate, quantity: u32, revenue: f64) -> Self {
        Self {
            sku: sku.to_string(),
            sale_date,
            quantity,
            revenue: round_price(revenue),
        }
    }
}

/// Round a monetary value to two decimal places
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
