//! Reward Functions
//!
//! Scores one price move against the market it lands in. Every component is
//! reported separately so a trajectory can be explained step by step.

use serde::{Deserialize, Serialize};

use super::config::RewardWeights;
use crate::domain::MarketState;

/// Inventory below this is treated as stock-out risk
pub const LOW_STOCK_THRESHOLD: f64 = 20.0;
/// Inventory above this is treated as overstock
pub const OVERSTOCK_THRESHOLD: f64 = 400.0;
/// Extra penalty once the shelf is empty
pub const STOCKOUT_PENALTY: f64 = 1.0;

/// Reward components for one step
///
/// Penalty components are already signed (zero or negative), so the total is a
/// plain weighted sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Revenue delta from the move, normalised by price
    pub profit: f64,
    /// Relative distance from the competitor price
    pub competitive: f64,
    /// Size of the swing
    pub stability: f64,
    /// Stock-out or overstock pressure
    pub inventory: f64,
    /// Weighted sum
    pub total: f64,
}

impl RewardBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Calculate total from components using the configured weights
    pub fn calculate_total(&mut self, weights: &RewardWeights) {
        self.total = weights.profit * self.profit
            + weights.competitive * self.competitive
            + weights.stability * self.stability
            + weights.inventory * self.inventory;
    }
}

/// Everything a reward function needs about one move
#[derive(Debug, Clone, Copy)]
pub struct PriceTransition<'a> {
    pub before: &'a MarketState,
    pub after: &'a MarketState,
    /// Applied delta
    pub delta: f64,
    /// Units demanded at the new price
    pub demand: f64,
}

/// Trait for computing rewards
pub trait RewardFunction {
    fn compute(&self, transition: &PriceTransition<'_>) -> RewardBreakdown;
}

/// Four-component heuristic reward
#[derive(Debug, Clone)]
pub struct PricingReward {
    weights: RewardWeights,
}

impl PricingReward {
    pub fn new(weights: RewardWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RewardWeights {
        &self.weights
    }
}

impl Default for PricingReward {
    fn default() -> Self {
        Self::new(RewardWeights::default())
    }
}

impl RewardFunction for PricingReward {
    fn compute(&self, t: &PriceTransition<'_>) -> RewardBreakdown {
        let old_price = t.before.current_price;
        let new_price = t.after.current_price;

        let mut signal = RewardBreakdown {
            profit: (new_price - old_price) * t.demand / (old_price * 100.0).max(1.0),
            competitive: competitive_component(new_price, t.after.competitor_price),
            stability: -t.delta.abs(),
            inventory: inventory_component(t.after.inventory_level),
            total: 0.0,
        };
        signal.calculate_total(&self.weights);
        signal
    }
}

/// `-|price - competitor| / competitor`
pub fn competitive_component(price: f64, competitor_price: f64) -> f64 {
    -(price - competitor_price).abs() / competitor_price.max(0.01)
}

/// Quadratic penalty outside the comfortable stock band
pub fn inventory_component(inventory: f64) -> f64 {
    if inventory <= 0.0 {
        -(1.0 + STOCKOUT_PENALTY)
    } else if inventory < LOW_STOCK_THRESHOLD {
        -((LOW_STOCK_THRESHOLD - inventory) / LOW_STOCK_THRESHOLD).powi(2)
    } else if inventory > OVERSTOCK_THRESHOLD {
        -((inventory - OVERSTOCK_THRESHOLD) / OVERSTOCK_THRESHOLD).powi(2)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(price: f64, competitor: f64, inventory: f64) -> MarketState {
        MarketState {
            current_price: price,
            competitor_price: competitor,
            reference_price: 10.0,
            inventory_level: inventory,
            engagement: 0.5,
            seasonal_factor: 1.0,
            demand_elasticity: -1.5,
        }
    }

    #[test]
    fn test_inventory_penalty_band() {
        assert_eq!(inventory_component(100.0), 0.0);
        assert_eq!(inventory_component(20.0), 0.0);
        assert_eq!(inventory_component(400.0), 0.0);
        assert!((inventory_component(10.0) + 0.25).abs() < 1e-12);
        assert!((inventory_component(800.0) + 1.0).abs() < 1e-12);
        assert_eq!(inventory_component(0.0), -2.0);
        assert!(inventory_component(0.0) < inventory_component(1.0));
    }

    #[test]
    fn test_competitive_penalty() {
        assert_eq!(competitive_component(10.0, 10.0), 0.0);
        assert!((competitive_component(11.0, 10.0) + 0.1).abs() < 1e-12);
        assert!((competitive_component(9.0, 10.0) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_weighted_sum() {
        let before = state(10.0, 10.0, 100.0);
        let after = state(11.0, 10.0, 10.0);
        let reward = PricingReward::default();
        let r = reward.compute(&PriceTransition {
            before: &before,
            after: &after,
            delta: 0.1,
            demand: 50.0,
        });

        assert!((r.profit - 0.05).abs() < 1e-12);
        assert!((r.competitive + 0.1).abs() < 1e-12);
        assert!((r.stability + 0.1).abs() < 1e-12);
        assert!((r.inventory + 0.25).abs() < 1e-12);

        let w = reward.weights();
        let expected = w.profit * 0.05 - w.competitive * 0.1 - w.stability * 0.1
            - w.inventory * 0.25;
        assert!((r.total - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weights_zero_total() {
        let before = state(10.0, 12.0, 0.0);
        let after = state(9.0, 12.0, 0.0);
        let reward = PricingReward::new(RewardWeights {
            profit: 0.0,
            competitive: 0.0,
            stability: 0.0,
            inventory: 0.0,
        });
        let r = reward.compute(&PriceTransition {
            before: &before,
            after: &after,
            delta: -0.1,
            demand: 80.0,
        });
        assert_eq!(r.total, 0.0);
        assert!(r.inventory < 0.0);
    }
}
