use std::path::{Path, PathBuf};
use std::time::Duration;

use warehouse::{CacheOutcome, CatalogConfig, CatalogLoader, Category, WarehouseError};

const HEADER: &str = "sample_id,catalog_content,image_link,price\n";

fn row(id: u32, name: &str, price: &str) -> String {
    format!(
        "{id},\"Item Name: {name}\nBullet Point 1: Great pantry staple\nValue: 12.0\nUnit: Ounce\",https://img.example/{id}.jpg,{price}\n"
    )
}

fn write_catalog(dir: &Path, rows: &[String]) -> PathBuf {
    let path = dir.join("train.csv");
    let mut body = HEADER.to_string();
    for r in rows {
        body.push_str(r);
    }
    std::fs::write(&path, body).unwrap();
    path
}

fn pantry_rows() -> Vec<String> {
    vec![
        row(1, "Espresso Roast Coffee", "12.99"),
        row(2, "Sea Salt Potato Chips", "3.49"),
        row(3, "Dark Chocolate Bar", "2.25"),
        row(4, "Sparkling Water 12 Pack", "5.00"),
        row(5, "Plain Greek Yogurt", "0"),
    ]
}

fn loader(cache_dir: &Path, sample_size: usize) -> CatalogLoader {
    CatalogLoader::new(CatalogConfig {
        data_dir: cache_dir.to_path_buf(),
        cache_dir: cache_dir.join("cache"),
        sample_size,
        seed: Some(7),
    })
}

/// The first load ingests the source; an unchanged source is then served from cache.
#[test]
fn second_load_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_catalog(dir.path(), &pantry_rows());
    let loader = loader(dir.path(), 100);

    let first = loader.load_or_build(&source).unwrap();
    assert_eq!(first.outcome, CacheOutcome::Rebuilt);
    assert_eq!(first.snapshot.sample.len(), 5);
    assert!(first.cache_path.exists(), "cache artifact should be written");

    let second = loader.load_or_build(&source).unwrap();
    assert_eq!(second.outcome, CacheOutcome::Hit);
    assert_eq!(second.snapshot.sample.len(), 5);
    assert_eq!(second.cache_path, first.cache_path);
}

/// Classification and price statistics come out of a single ingestion pass.
#[test]
fn snapshot_carries_categories_and_price_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_catalog(dir.path(), &pantry_rows());
    let snapshot = loader(dir.path(), 100)
        .load_or_build(&source)
        .unwrap()
        .snapshot;

    let coffee = snapshot.sample.product("1").expect("product 1 sampled");
    assert_eq!(coffee.category, Category::CoffeeTea);
    assert_eq!(
        snapshot.sample.product("2").map(|p| p.category),
        Some(Category::SnacksChips)
    );

    let dist = &snapshot.price_distribution;
    assert_eq!(dist.priced_count, 4, "zero prices are excluded");
    assert_eq!(dist.zero_price_count, 1);
    assert!((dist.min - 2.25).abs() < 1e-9);
    assert!((dist.max - 12.99).abs() < 1e-9);

    let total: usize = snapshot
        .category_stats
        .categories
        .values()
        .map(|s| s.count)
        .sum();
    assert_eq!(total, 5, "every sampled product lands in exactly one category");
}

/// Growing the source file changes its signature and forces a rebuild.
#[test]
fn modified_source_invalidates_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = pantry_rows();
    let source = write_catalog(dir.path(), &rows);
    let loader = loader(dir.path(), 100);
    loader.load_or_build(&source).unwrap();

    rows.push(row(6, "Ground Cinnamon", "4.10"));
    write_catalog(dir.path(), &rows);

    let reloaded = loader.load_or_build(&source).unwrap();
    assert_eq!(reloaded.outcome, CacheOutcome::Rebuilt);
    assert_eq!(reloaded.snapshot.sample.len(), 6);
    assert!(reloaded.snapshot.sample.product("6").is_some());
}

/// Touching the source without changing its size still forces a rebuild.
#[test]
fn touched_source_invalidates_cache() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_catalog(dir.path(), &pantry_rows());
    let loader = loader(dir.path(), 100);
    let first = loader.load_or_build(&source).unwrap();
    let size = std::fs::metadata(&source).unwrap().len();

    let modified = std::fs::metadata(&source).unwrap().modified().unwrap();
    std::fs::File::options()
        .write(true)
        .open(&source)
        .and_then(|f| f.set_modified(modified + Duration::from_secs(90)))
        .unwrap();
    assert_eq!(std::fs::metadata(&source).unwrap().len(), size);

    let reloaded = loader.load_or_build(&source).unwrap();
    assert_eq!(reloaded.outcome, CacheOutcome::Rebuilt);
    assert_eq!(reloaded.cache_path, first.cache_path);
    assert_eq!(
        loader.load_or_build(&source).unwrap().outcome,
        CacheOutcome::Hit,
        "the rebuilt cache should carry the new signature"
    );
}

/// Malformed and duplicate rows are counted but never occupy a reservoir slot.
#[test]
fn bad_rows_are_counted_not_sampled() {
    let dir = tempfile::tempdir().unwrap();
    let mut rows = pantry_rows();
    rows.push(row(7, "Mystery Item", "not-a-price"));
    rows.push(row(1, "Espresso Roast Coffee Again", "13.99"));
    let source = write_catalog(dir.path(), &rows);

    let snapshot = loader(dir.path(), 100)
        .load_or_build(&source)
        .unwrap()
        .snapshot;
    let ingest = &snapshot.sample.ingest;
    assert_eq!(ingest.rows_read, 7);
    assert_eq!(ingest.malformed_records, 1);
    assert_eq!(ingest.duplicate_ids, 1);
    assert_eq!(snapshot.sample.len(), 5);
}

/// The reservoir never holds more than its capacity.
#[test]
fn sample_is_bounded_by_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<String> = (0..50)
        .map(|i| row(i, &format!("Snack Mix {i}"), "1.50"))
        .collect();
    let source = write_catalog(dir.path(), &rows);

    let snapshot = loader(dir.path(), 10).rebuild(&source).unwrap().snapshot;
    assert_eq!(snapshot.sample.len(), 10);
    assert_eq!(snapshot.sample.capacity, 10);
    assert_eq!(snapshot.sample.ingest.valid_records, 50);
}

/// A missing source surfaces as `SourceNotFound`, not an I/O panic.
#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader(dir.path(), 10)
        .load_or_build(&dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(
        matches!(err, WarehouseError::SourceNotFound(_)),
        "expected SourceNotFound, got: {err}"
    );
}
