//! Aggregate statistics over a catalog sample
//!
//! Computed once per cache rebuild and stored alongside the sample.

use std::collections::BTreeMap;

use crate::domain::{CatalogSample, CategoryStats, CategorySummary, PriceDistribution};

#[derive(Default)]
struct CategoryAccumulator {
    count: usize,
    priced_count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl CategoryAccumulator {
    fn add(&mut self, price: f64) {
        self.count += 1;
        if price <= 0.0 {
            return;
        }
        if self.priced_count == 0 {
            self.min = price;
            self.max = price;
        } else {
            self.min = self.min.min(price);
            self.max = self.max.max(price);
        }
        self.priced_count += 1;
        self.sum += price;
    }

    fn summary(&self) -> CategorySummary {
        CategorySummary {
            count: self.count,
            priced_count: self.priced_count,
            avg_price: if self.priced_count > 0 {
                self.sum / self.priced_count as f64
            } else {
                0.0
            },
            min_price: self.min,
            max_price: self.max,
        }
    }
}

/// Category stats and price distribution for a sample
pub fn aggregate(sample: &CatalogSample) -> (CategoryStats, PriceDistribution) {
    let mut accumulators: BTreeMap<_, CategoryAccumulator> = BTreeMap::new();
    let mut prices = Vec::with_capacity(sample.len());
    let mut zero_price_count = 0;

    for product in &sample.products {
        accumulators
            .entry(product.category)
            .or_default()
            .add(product.price);
        if product.is_priced() {
            prices.push(product.price);
        } else {
            zero_price_count += 1;
        }
    }

    let category_stats = CategoryStats {
        categories: accumulators
            .into_iter()
            .map(|(category, acc)| (category, acc.summary()))
            .collect(),
    };

    let mut distribution = price_distribution(&mut prices);
    distribution.zero_price_count = zero_price_count;

    (category_stats, distribution)
}

/// Distribution summary of a set of prices
///
/// Sorts `prices` in place for the median. The coefficient of variation is left
/// undefined (`None`) when the mean is zero.
pub fn price_distribution(prices: &mut [f64]) -> PriceDistribution {
    if prices.is_empty() {
        return PriceDistribution::default();
    }

    prices.sort_by(|a, b| a.total_cmp(b));

    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mid = prices.len() / 2;
    let median = if prices.len() % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    };

    PriceDistribution {
        priced_count: prices.len(),
        zero_price_count: 0,
        mean,
        median,
        std_dev,
        coefficient_of_variation: coefficient_of_variation(std_dev, mean),
        min: prices[0],
        max: prices[prices.len() - 1],
    }
}

pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> Option<f64> {
    if mean == 0.0 || !mean.is_finite() {
        None
    } else {
        Some(std_dev / mean)
    }
}
