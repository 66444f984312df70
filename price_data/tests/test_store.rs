use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use price_data::{
    CsvHistoryStore, HistoryError, HistoryStore, MemoryHistoryStore, PriceObservation, Product,
    SalesObservation,
};

#[test]
fn test_memory_store_filters_and_sorts() {
    let mut store = MemoryHistoryStore::new();
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 4, d, 12, 0, 0).unwrap();

    // Inserted out of order, mixed with another SKU
    store.add_price(PriceObservation::new("SKU-1", 12.0, day(3)));
    store.add_price(PriceObservation::new("SKU-1", 10.0, day(1)));
    store.add_price(PriceObservation::new("SKU-2", 99.0, day(2)));
    store.add_price(PriceObservation::new("SKU-1", 11.0, day(2)));

    let rows = store
        .price_observations("SKU-1", day(1), day(31))
        .unwrap();
    let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![10.0, 11.0, 12.0]);

    // Window bounds are inclusive
    let rows = store.price_observations("SKU-1", day(2), day(2)).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_memory_store_unknown_product() {
    let store = MemoryHistoryStore::new();
    assert!(matches!(
        store.product_by_sku("SKU-404"),
        Err(HistoryError::UnknownProduct(_))
    ));
}

#[test]
fn test_csv_store_price_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::new(dir.path()).unwrap();
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 4, d, 9, 30, 0).unwrap();

    let rows = vec![
        PriceObservation::new("SKU-1", 100.5, day(1)).with_supplier("acme"),
        PriceObservation::new("SKU-1", 101.25, day(2)),
        PriceObservation {
            sku: "SKU-1".to_string(),
            price: 99.0,
            currency: "USD".to_string(),
            collected_at: day(3),
            supplier: None,
            synthetic: true,
        },
    ];
    store.append_prices(&rows).unwrap();

    let read = store
        .price_observations("SKU-1", day(1), day(30))
        .unwrap();
    assert_eq!(read, rows);
}

#[test]
fn test_csv_store_appends_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::new(dir.path()).unwrap();
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 4, d, 9, 0, 0).unwrap();

    store
        .append_prices(&[PriceObservation::new("SKU-1", 10.0, day(1))])
        .unwrap();
    store
        .append_prices(&[PriceObservation::new("SKU-1", 11.0, day(2))])
        .unwrap();

    let read = store
        .price_observations("SKU-1", day(1), day(30))
        .unwrap();
    assert_eq!(read.len(), 2);
}

#[test]
fn test_csv_store_sales_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::new(dir.path()).unwrap();
    let date = |d: u32| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();

    let rows = vec![
        SalesObservation::new("SKU-1", date(1), 4, 40.0),
        SalesObservation::new("SKU-1", date(2), 0, 0.0),
    ];
    store.append_sales(&rows).unwrap();

    let read = store.sales_observations("SKU-1", date(1), date(30)).unwrap();
    assert_eq!(read, rows);
}

#[test]
fn test_csv_store_product_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::new(dir.path()).unwrap();

    let mut product = Product::new(7, "SKU-7", "Filter papers", "supplies");
    product.min_stock = 12;
    store.write_products(std::slice::from_ref(&product)).unwrap();

    let found = store.product_by_sku("SKU-7").unwrap();
    assert_eq!(found, product);

    assert!(matches!(
        store.product_by_sku("SKU-404"),
        Err(HistoryError::UnknownProduct(_))
    ));
}

#[test]
fn test_csv_store_empty_reads() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvHistoryStore::new(dir.path()).unwrap();
    let day = |d: u32| Utc.with_ymd_and_hms(2024, 4, d, 9, 0, 0).unwrap();

    assert!(store
        .price_observations("SKU-1", day(1), day(30))
        .unwrap()
        .is_empty());
}
