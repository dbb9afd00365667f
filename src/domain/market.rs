use rand::Rng;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// List price assumed for products sold at zero
pub const FALLBACK_BASE_PRICE: f64 = 10.0;

/// Simulated market snapshot for one product
///
/// Owned by a single simulation run and never shared between runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Our listed price
    pub current_price: f64,
    /// Price the competitor is charging
    pub competitor_price: f64,
    /// Price demand is measured against (the product's list price)
    pub reference_price: f64,
    /// Units on hand
    pub inventory_level: f64,
    /// Demand-signal proxy, 0.05 - 1.0
    pub engagement: f64,
    /// Multiplicative seasonality, 0.5 - 1.5
    pub seasonal_factor: f64,
    /// Negative price sensitivity, -3.0 to -0.5
    pub demand_elasticity: f64,
}

impl MarketState {
    /// Randomised starting conditions for one product
    pub fn generate<R: Rng>(product: &Product, rng: &mut R) -> Self {
        let base = if product.is_priced() {
            product.price
        } else {
            FALLBACK_BASE_PRICE
        };
        Self {
            current_price: base,
            competitor_price: (base * rng.gen_range(0.8f64..=1.2)).max(0.01),
            reference_price: base,
            inventory_level: rng.gen_range(5..=500) as f64,
            engagement: rng.gen_range(0.1..=1.0),
            seasonal_factor: rng.gen_range(0.5..=1.5),
            demand_elasticity: rng.gen_range(-3.0..=-0.5),
        }
    }

    /// Relative gap to the competitor: positive when we are more expensive
    pub fn competitor_gap_pct(&self) -> f64 {
        if self.competitor_price <= 0.0 {
            return 0.0;
        }
        (self.current_price - self.competitor_price) / self.competitor_price
    }

    pub fn is_stocked_out(&self) -> bool {
        self.inventory_level <= 0.0
    }
}
