use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::product::{Category, Product};
use crate::catalog::SourceSignature;

/// Counters collected during one ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Data rows read from the source (header excluded)
    pub rows_read: u64,
    /// Rows that parsed into a product and were offered to the reservoir
    pub valid_records: u64,
    /// Rows skipped because a required field was missing or unparseable
    pub malformed_records: u64,
    /// Valid rows skipped because their id was already in the reservoir
    pub duplicate_ids: u64,
}

impl IngestSummary {
    pub fn skipped(&self) -> u64 {
        self.malformed_records + self.duplicate_ids
    }
}

/// Bounded, uniformly sampled subset of a catalog source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSample {
    pub products: Vec<Product>,
    pub source_signature: SourceSignature,
    /// Configured reservoir size the sample was drawn with
    pub capacity: usize,
    pub ingest: IngestSummary,
}

impl CatalogSample {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.category == category)
    }

    /// Case-insensitive substring search over name and description
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> {
        let needle = query.trim().to_lowercase();
        self.products.iter().filter(move |p| {
            needle.is_empty()
                || p.name_text.to_lowercase().contains(&needle)
                || p.description_text.to_lowercase().contains(&needle)
        })
    }
}

/// Per-category aggregate over the sample
///
/// `count` includes zero-priced products; the price figures only cover priced ones
/// and are zero when a category has no priced member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    pub priced_count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Category name to summary mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub categories: BTreeMap<Category, CategorySummary>,
}

impl CategoryStats {
    pub fn get(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.get(&category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories ordered by member count, largest first
    pub fn by_count_desc(&self) -> Vec<(Category, CategorySummary)> {
        let mut entries: Vec<_> = self.categories.iter().map(|(c, s)| (*c, *s)).collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
        entries
    }
}

/// Summary of the price distribution over priced products in the sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceDistribution {
    pub priced_count: usize,
    pub zero_price_count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// `std_dev / mean`; `None` when the mean is zero
    pub coefficient_of_variation: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Everything the cache persists for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub sample: CatalogSample,
    pub category_stats: CategoryStats,
    pub price_distribution: PriceDistribution,
}
