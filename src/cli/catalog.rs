//! `warehouse ingest | stats | products`

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::output::{self, FieldRow};
use super::App;
use crate::catalog::{CacheOutcome, LoadedCatalog};
use crate::domain::{format_price, Category, Product};

#[derive(Debug, Serialize)]
struct IngestReport<'a> {
    source: &'a Path,
    cache_path: &'a Path,
    cache_hit: bool,
    rows_read: u64,
    valid_records: u64,
    malformed_records: u64,
    duplicate_ids: u64,
    sampled: usize,
    capacity: usize,
    categories: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct CategoryRow {
    pub category: String,
    pub count: usize,
    pub share: String,
    pub priced: usize,
    pub avg_price: String,
    pub min_price: String,
    pub max_price: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.display_name(),
            category: p.category.to_string(),
            price: p.price_display(),
        }
    }
}

pub fn ingest(app: &App, source: Option<&Path>, rebuild: bool) -> Result<()> {
    let loaded = app.load_catalog(source, rebuild)?;
    let sample = &loaded.snapshot.sample;
    let report = IngestReport {
        source: &loaded.source,
        cache_path: &loaded.cache_path,
        cache_hit: loaded.outcome == CacheOutcome::Hit,
        rows_read: sample.ingest.rows_read,
        valid_records: sample.ingest.valid_records,
        malformed_records: sample.ingest.malformed_records,
        duplicate_ids: sample.ingest.duplicate_ids,
        sampled: sample.len(),
        capacity: sample.capacity,
        categories: loaded.snapshot.category_stats.len(),
    };

    if app.mode.is_json() {
        return output::print_json(&report);
    }

    let outcome = match loaded.outcome {
        CacheOutcome::Hit => "loaded from cache",
        CacheOutcome::Rebuilt => "rebuilt",
    };
    output::print_success(&format!("Catalog {outcome}: {} products", sample.len()));
    output::print_fields(&[
        FieldRow::new("source", report.source.display()),
        FieldRow::new("cache", report.cache_path.display()),
        FieldRow::new("rows read", report.rows_read),
        FieldRow::new("valid records", report.valid_records),
        FieldRow::new("malformed (skipped)", report.malformed_records),
        FieldRow::new("duplicate ids (skipped)", report.duplicate_ids),
        FieldRow::new("sampled", format!("{} / {}", report.sampled, report.capacity)),
        FieldRow::new("categories", report.categories),
    ]);
    Ok(())
}

pub fn category_rows(loaded: &LoadedCatalog) -> Vec<CategoryRow> {
    let total = loaded.snapshot.sample.len().max(1) as f64;
    loaded
        .snapshot
        .category_stats
        .by_count_desc()
        .into_iter()
        .map(|(category, s)| CategoryRow {
            category: category.to_string(),
            count: s.count,
            share: format!("{:.1}%", s.count as f64 / total * 100.0),
            priced: s.priced_count,
            avg_price: format_price(s.avg_price),
            min_price: format_price(s.min_price),
            max_price: format_price(s.max_price),
        })
        .collect()
}

pub fn stats(app: &App, source: Option<&Path>) -> Result<()> {
    let loaded = app.load_catalog(source, false)?;
    let dist = &loaded.snapshot.price_distribution;

    if app.mode.is_json() {
        return output::print_json(&serde_json::json!({
            "categories": loaded.snapshot.category_stats,
            "price_distribution": dist,
            "sampled": loaded.snapshot.sample.len(),
        }));
    }

    output::print_heading("Categories");
    output::print_items(&category_rows(&loaded), app.mode)?;

    output::print_heading("Price distribution");
    let cv = dist
        .coefficient_of_variation
        .map(|cv| format!("{cv:.3}"))
        .unwrap_or_else(|| "undefined".to_string());
    output::print_fields(&[
        FieldRow::new("priced products", dist.priced_count),
        FieldRow::new("zero-price products", dist.zero_price_count),
        FieldRow::new("mean", format_price(dist.mean)),
        FieldRow::new("median", format_price(dist.median)),
        FieldRow::new("std dev", format_price(dist.std_dev)),
        FieldRow::new("coefficient of variation", cv),
        FieldRow::new("min", format_price(dist.min)),
        FieldRow::new("max", format_price(dist.max)),
    ]);
    Ok(())
}

/// Match a category by label ignoring case and punctuation ("coffee-tea", "Coffee & Tea")
pub fn parse_category(input: &str) -> Option<Category> {
    fn key(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
    let wanted = key(input);
    Category::all()
        .iter()
        .copied()
        .find(|c| key(c.as_str()) == wanted)
}

pub fn products(
    app: &App,
    source: Option<&Path>,
    category: Option<&str>,
    search: Option<&str>,
    limit: usize,
) -> Result<()> {
    let category = match category {
        Some(label) => Some(parse_category(label).ok_or_else(|| {
            let known: Vec<_> = Category::all().iter().map(|c| c.as_str()).collect();
            anyhow::anyhow!("unknown category '{label}' (known: {})", known.join(", "))
        })?),
        None => None,
    };

    let loaded = app.load_catalog(source, false)?;
    let rows: Vec<ProductRow> = loaded
        .snapshot
        .sample
        .search(search.unwrap_or(""))
        .filter(|p| category.map_or(true, |c| p.category == c))
        .take(limit)
        .map(ProductRow::from)
        .collect();
    output::print_items(&rows, app.mode)
}
