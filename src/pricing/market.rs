//! Simulated Market
//!
//! Demand model plus the random evolution of everything except our own price.

use rand::Rng;

use crate::domain::MarketState;

/// Market dynamics configuration
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Units demanded at the reference price with neutral season and full engagement
    pub base_demand: f64,
    /// Max relative competitor move per step
    pub competitor_drift: f64,
    /// Fraction of simulated demand that leaves the shelf each step
    pub sell_through: f64,
    /// Chance of a restock on any step
    pub replenish_probability: f64,
    /// Chance of a restock once stock is low
    pub low_stock_replenish_probability: f64,
    /// Restock size range in units
    pub replenish_min: f64,
    pub replenish_max: f64,
    /// Inventory below which the low-stock restock chance applies
    pub low_stock_level: f64,
    pub engagement_step: f64,
    pub engagement_range: (f64, f64),
    pub seasonal_step: f64,
    pub seasonal_range: (f64, f64),
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_demand: 100.0,
            competitor_drift: 0.03,
            sell_through: 0.1,
            replenish_probability: 0.05,
            low_stock_replenish_probability: 0.3,
            replenish_min: 50.0,
            replenish_max: 200.0,
            low_stock_level: 20.0,
            engagement_step: 0.05,
            engagement_range: (0.05, 1.0),
            seasonal_step: 0.1,
            seasonal_range: (0.5, 1.5),
        }
    }
}

/// Stateless market model; the caller owns both the state and the RNG
#[derive(Debug, Clone, Default)]
pub struct SimulatedMarket {
    config: MarketConfig,
}

impl SimulatedMarket {
    pub fn new(config: MarketConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// `base · (price/reference)^elasticity · seasonal · engagement`
    pub fn demand(&self, state: &MarketState, price: f64) -> f64 {
        if price <= 0.0 || state.reference_price <= 0.0 {
            return 0.0;
        }
        let ratio = price / state.reference_price;
        let demand = self.config.base_demand
            * ratio.powf(state.demand_elasticity)
            * state.seasonal_factor
            * state.engagement;
        if demand.is_finite() {
            demand.max(0.0)
        } else {
            0.0
        }
    }

    /// Advance the market one step after we move to `new_price`
    ///
    /// Returns the new state and the demand realised at `new_price`. Elasticity
    /// and the reference price stay fixed for the whole run.
    pub fn step<R: Rng>(
        &self,
        before: &MarketState,
        new_price: f64,
        rng: &mut R,
    ) -> (MarketState, f64) {
        let c = &self.config;
        let demand = self.demand(before, new_price);

        let competitor_move = rng.gen_range(-c.competitor_drift..=c.competitor_drift);
        let competitor_price = (before.competitor_price * (1.0 + competitor_move)).max(0.01);

        let mut inventory_level = (before.inventory_level - demand * c.sell_through).max(0.0);
        let restock_chance = if inventory_level < c.low_stock_level {
            c.low_stock_replenish_probability
        } else {
            c.replenish_probability
        };
        let restock_roll: f64 = rng.gen();
        let restock_size = rng.gen_range(c.replenish_min..=c.replenish_max);
        if restock_roll < restock_chance {
            inventory_level += restock_size.round();
        }

        let engagement = (before.engagement + rng.gen_range(-c.engagement_step..=c.engagement_step))
            .clamp(c.engagement_range.0, c.engagement_range.1);
        let seasonal_factor = (before.seasonal_factor
            + rng.gen_range(-c.seasonal_step..=c.seasonal_step))
        .clamp(c.seasonal_range.0, c.seasonal_range.1);

        let after = MarketState {
            current_price: new_price,
            competitor_price,
            reference_price: before.reference_price,
            inventory_level,
            engagement,
            seasonal_factor,
            demand_elasticity: before.demand_elasticity,
        };
        (after, demand)
    }
}
