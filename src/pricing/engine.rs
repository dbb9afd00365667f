//! Pricing Simulation Engine
//!
//! One run steps a synthetic market for a single product:
//!
//! ```text
//! propose ─► clamp ─► apply ─► market.step ─► reward ─► record
//!    ▲                                           │
//!    └──────────── policy.observe ◄──────────────┘
//! ```
//!
//! Everything random comes from one `StdRng` seeded per run, so a seed fully
//! determines the trajectory.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::action::{PricingAction, MIN_PRICE};
use super::config::{EngineSettings, MAX_STEPS};
use super::market::SimulatedMarket;
use super::policy::HillClimbPolicy;
use super::reward::{PriceTransition, PricingReward, RewardBreakdown, RewardFunction};
use crate::domain::{CatalogSample, MarketState, Product, SimulationPhase};
use crate::error::{Result, WarehouseError};
use crate::validation::validate_step_count;

/// One recorded step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// Zero-based
    pub step_index: usize,
    pub state_before: MarketState,
    pub action: PricingAction,
    pub state_after: MarketState,
    pub reward: RewardBreakdown,
    /// Units demanded at the post-action price
    pub demand: f64,
}

/// Complete trajectory of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub product_id: String,
    pub product_name: String,
    /// Seed the run was drawn from; replaying it reproduces the run
    pub seed: u64,
    pub phase: SimulationPhase,
    pub initial_state: MarketState,
    pub steps: Vec<SimulationStep>,
    /// Sum of `discount_factor^step_index * reward`
    pub discounted_return: f64,
    /// Undiscounted reward sum
    pub total_reward: f64,
    pub avg_reward: f64,
    pub initial_price: f64,
    pub final_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl SimulationResult {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Relative change from the initial to the final price, in percent
    pub fn price_change_pct(&self) -> f64 {
        if self.initial_price > 0.0 {
            (self.final_price - self.initial_price) / self.initial_price * 100.0
        } else {
            0.0
        }
    }
}

/// Best candidate from a one-shot price search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub current_price: f64,
    pub suggested_price: f64,
    pub action: PricingAction,
    pub reward: RewardBreakdown,
}

/// Runs pricing simulations under one settings profile
#[derive(Debug, Clone)]
pub struct PricingEngine {
    settings: EngineSettings,
    market: SimulatedMarket,
    reward: PricingReward,
}

impl PricingEngine {
    /// Build an engine; settings are validated up front
    pub fn new(settings: EngineSettings) -> Result<Self> {
        Self::with_market(settings, SimulatedMarket::default())
    }

    pub fn with_market(settings: EngineSettings, market: SimulatedMarket) -> Result<Self> {
        settings.validate()?;
        let reward = PricingReward::new(settings.weights());
        Ok(Self {
            settings,
            market,
            reward,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Simulate `step_count` steps for one product of `sample`
    ///
    /// Fails before any step runs when the product is unknown or the step
    /// count exceeds [`MAX_STEPS`]. Without a seed a fresh one is drawn and
    /// recorded in the result.
    pub fn simulate(
        &self,
        sample: &CatalogSample,
        product_id: &str,
        step_count: usize,
        seed: Option<u64>,
    ) -> Result<SimulationResult> {
        let product = sample
            .product(product_id)
            .ok_or_else(|| WarehouseError::ProductNotFound(product_id.to_string()))?;
        self.simulate_product(product, step_count, seed)
    }

    /// Simulate a product that is already resolved
    pub fn simulate_product(
        &self,
        product: &Product,
        step_count: usize,
        seed: Option<u64>,
    ) -> Result<SimulationResult> {
        validate_step_count(step_count, MAX_STEPS)?;
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let initial = MarketState::generate(product, &mut rng);
        self.run(product, initial, step_count, seed, &mut rng)
    }

    fn run(
        &self,
        product: &Product,
        initial: MarketState,
        step_count: usize,
        seed: u64,
        rng: &mut StdRng,
    ) -> Result<SimulationResult> {
        let mut phase = SimulationPhase::Initialized;
        let mut policy = HillClimbPolicy::new(&self.settings);
        let mut state = initial;
        let mut steps = Vec::with_capacity(step_count);
        let mut discounted_return = 0.0;
        let mut total_reward = 0.0;
        let mut min_price = initial.current_price;
        let mut max_price = initial.current_price;

        debug!(
            "Simulating {} for {} steps (seed {})",
            product.id, step_count, seed
        );

        for step_index in 0..step_count {
            phase = transition(phase, SimulationPhase::Stepping)?;

            let raw = policy.propose(step_index, rng);
            let action = PricingAction::clamped(raw, &self.settings);
            let new_price = action.apply(state.current_price);
            let (after, demand) = self.market.step(&state, new_price, rng);

            let reward = self.reward.compute(&PriceTransition {
                before: &state,
                after: &after,
                delta: action.delta,
                demand,
            });
            let hold = self.hold_reward(&state, &after);
            policy.observe(&action, reward.total, hold.total);

            let exponent = i32::try_from(step_index).unwrap_or(i32::MAX);
            discounted_return += self.settings.discount_factor.powi(exponent) * reward.total;
            total_reward += reward.total;
            min_price = min_price.min(new_price);
            max_price = max_price.max(new_price);

            debug!(
                step = step_index,
                delta = action.delta,
                price = new_price,
                reward = reward.total,
                inventory = after.inventory_level,
                "pricing step"
            );

            steps.push(SimulationStep {
                step_index,
                state_before: state,
                action,
                state_after: after,
                reward,
                demand,
            });
            state = after;
        }

        phase = transition(phase, SimulationPhase::Completed)?;

        let avg_reward = if steps.is_empty() {
            0.0
        } else {
            total_reward / steps.len() as f64
        };
        let result = SimulationResult {
            product_id: product.id.clone(),
            product_name: product.display_name(),
            seed,
            phase,
            initial_state: initial,
            steps,
            discounted_return,
            total_reward,
            avg_reward,
            initial_price: initial.current_price,
            final_price: state.current_price,
            min_price,
            max_price,
        };

        info!(
            "Simulation {} done: {} steps, return {:.4}, price {:.2} -> {:.2}",
            result.product_id,
            result.step_count(),
            result.discounted_return,
            result.initial_price,
            result.final_price
        );
        Ok(result)
    }

    /// Reward for leaving the price unchanged, scored against the same market move
    fn hold_reward(&self, before: &MarketState, after: &MarketState) -> RewardBreakdown {
        let held = MarketState {
            current_price: before.current_price,
            ..*after
        };
        self.reward.compute(&PriceTransition {
            before,
            after: &held,
            delta: 0.0,
            demand: self.market.demand(before, before.current_price),
        })
    }

    /// One-shot grid search for the best next price
    ///
    /// Candidates are the current price, moves of 25/50/75% of the allowed
    /// swing either way, and the competitor price ±2%. Each is clamped to the
    /// configured bounds and scored without evolving the market. Ties keep the
    /// earlier candidate, so holding wins a tie.
    pub fn suggest_price(&self, state: &MarketState) -> PriceSuggestion {
        let base = state.current_price;
        let swing = self.settings.max_swing();
        let mut candidates = vec![base];
        for fraction in [0.25, 0.50, 0.75] {
            candidates.push(base * (1.0 - swing * fraction));
            candidates.push(base * (1.0 + swing * fraction));
        }
        for factor in [1.0, 0.98, 1.02] {
            candidates.push(state.competitor_price * factor);
        }

        let mut best: Option<PriceSuggestion> = None;
        for candidate in candidates {
            let raw = if base > 0.0 {
                candidate.max(MIN_PRICE) / base - 1.0
            } else {
                0.0
            };
            let action = PricingAction::clamped(raw, &self.settings);
            let price = action.apply(base);
            let after = MarketState {
                current_price: price,
                ..*state
            };
            let reward = self.reward.compute(&PriceTransition {
                before: state,
                after: &after,
                delta: action.delta,
                demand: self.market.demand(state, price),
            });
            if best.map_or(true, |b| reward.total > b.reward.total) {
                best = Some(PriceSuggestion {
                    current_price: base,
                    suggested_price: price,
                    action,
                    reward,
                });
            }
        }

        best.unwrap_or(PriceSuggestion {
            current_price: base,
            suggested_price: base,
            action: PricingAction::hold(),
            reward: RewardBreakdown::zero(),
        })
    }

    /// Generate a market for a product and suggest a price for it
    pub fn suggest_for_product(
        &self,
        product: &Product,
        seed: Option<u64>,
    ) -> (MarketState, PriceSuggestion) {
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let state = MarketState::generate(product, &mut rng);
        let suggestion = self.suggest_price(&state);
        (state, suggestion)
    }
}

fn transition(from: SimulationPhase, to: SimulationPhase) -> Result<SimulationPhase> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(WarehouseError::Internal(format!(
            "invalid simulation transition {from} -> {to}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceSignature;
    use crate::domain::{Category, IngestSummary};

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            price,
            name_text: format!("Arabica Beans {id}"),
            bullet_points: String::new(),
            description_text: String::new(),
            category: Category::CoffeeTea,
            unit: None,
            value: None,
            image_link: None,
        }
    }

    fn sample() -> CatalogSample {
        CatalogSample {
            products: vec![product("a", 12.5), product("b", 0.0), product("c", 3.0)],
            source_signature: SourceSignature::default(),
            capacity: 10,
            ingest: IngestSummary::default(),
        }
    }

    fn engine() -> PricingEngine {
        PricingEngine::new(EngineSettings::default()).unwrap()
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let e = engine();
        let s = sample();
        let a = e.simulate(&s, "a", 40, Some(42)).unwrap();
        let b = e.simulate(&s, "a", 40, Some(42)).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );

        let c = e.simulate(&s, "a", 40, Some(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_unseeded_run_is_replayable() {
        let e = engine();
        let s = sample();
        let first = e.simulate(&s, "c", 15, None).unwrap();
        let replay = e.simulate(&s, "c", 15, Some(first.seed)).unwrap();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_unknown_product() {
        let err = engine().simulate(&sample(), "zzz", 10, Some(1)).unwrap_err();
        assert!(matches!(err, WarehouseError::ProductNotFound(id) if id == "zzz"));
    }

    #[test]
    fn test_zero_steps_completes_empty() {
        let r = engine().simulate(&sample(), "a", 0, Some(1)).unwrap();
        assert_eq!(r.phase, SimulationPhase::Completed);
        assert!(r.steps.is_empty());
        assert_eq!(r.discounted_return, 0.0);
        assert_eq!(r.total_reward, 0.0);
        assert_eq!(r.avg_reward, 0.0);
        assert_eq!(r.final_price, r.initial_price);
    }

    #[test]
    fn test_too_many_steps_rejected() {
        let err = engine()
            .simulate(&sample(), "a", MAX_STEPS + 1, Some(1))
            .unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidSettings(_)));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = EngineSettings {
            discount_factor: 1.1,
            ..Default::default()
        };
        assert!(matches!(
            PricingEngine::new(settings),
            Err(WarehouseError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_deltas_within_bounds() {
        let settings = EngineSettings {
            min_pct: -0.05,
            max_pct: 0.1,
            exploration_rate: 0.5,
            learning_rate: 0.2,
            ..Default::default()
        };
        let e = PricingEngine::new(settings.clone()).unwrap();
        let s = sample();
        for seed in 0..20 {
            let r = e.simulate(&s, "a", 60, Some(seed)).unwrap();
            for step in &r.steps {
                assert!(step.action.delta.abs() <= settings.max_swing() + 1e-12);
                assert!(step.action.delta >= settings.min_pct);
                assert!(step.action.delta <= settings.max_pct);
                assert!(step.state_after.current_price >= MIN_PRICE);
            }
        }
    }

    #[test]
    fn test_steps_chain_and_return_accumulates() {
        let settings = EngineSettings::default();
        let gamma = settings.discount_factor;
        let r = PricingEngine::new(settings)
            .unwrap()
            .simulate(&sample(), "a", 25, Some(7))
            .unwrap();

        assert_eq!(r.step_count(), 25);
        assert_eq!(r.steps[0].state_before, r.initial_state);
        for pair in r.steps.windows(2) {
            assert_eq!(pair[0].state_after, pair[1].state_before);
            assert_eq!(pair[1].step_index, pair[0].step_index + 1);
        }

        let expected: f64 = r
            .steps
            .iter()
            .map(|s| gamma.powi(s.step_index as i32) * s.reward.total)
            .sum();
        assert!((r.discounted_return - expected).abs() < 1e-9);
        assert_eq!(r.final_price, r.steps[24].state_after.current_price);
        assert!(r.min_price <= r.final_price && r.final_price <= r.max_price);
    }

    #[test]
    fn test_zero_discount_counts_only_first_step() {
        let settings = EngineSettings {
            discount_factor: 0.0,
            ..Default::default()
        };
        let r = PricingEngine::new(settings)
            .unwrap()
            .simulate(&sample(), "a", 10, Some(3))
            .unwrap();
        assert!((r.discounted_return - r.steps[0].reward.total).abs() < 1e-12);
    }

    #[test]
    fn test_zero_priced_product_uses_fallback() {
        let r = engine().simulate(&sample(), "b", 5, Some(3)).unwrap();
        assert_eq!(r.initial_price, 10.0);
    }

    #[test]
    fn test_suggest_price_within_bounds() {
        let e = engine();
        let state = MarketState {
            current_price: 10.0,
            competitor_price: 14.0,
            reference_price: 10.0,
            inventory_level: 200.0,
            engagement: 0.8,
            seasonal_factor: 1.0,
            demand_elasticity: -1.2,
        };
        let s = e.suggest_price(&state);
        assert!(s.action.delta.abs() <= e.settings().max_swing() + 1e-12);
        assert!((s.suggested_price - s.action.apply(10.0)).abs() < 1e-12);
        assert_eq!(s.current_price, 10.0);
    }

    #[test]
    fn test_suggest_holds_when_only_penalties_apply() {
        let settings = EngineSettings {
            profit_weight: 0.0,
            competitive_weight: 0.0,
            ..Default::default()
        };
        let e = PricingEngine::new(settings).unwrap();
        let state = MarketState {
            current_price: 10.0,
            competitor_price: 10.0,
            reference_price: 10.0,
            inventory_level: 100.0,
            engagement: 0.5,
            seasonal_factor: 1.0,
            demand_elasticity: -1.5,
        };
        let s = e.suggest_price(&state);
        assert!(s.action.is_hold());
        assert_eq!(s.suggested_price, 10.0);
    }

    #[test]
    fn test_suggest_for_product_is_seeded() {
        let e = engine();
        let p = product("x", 8.0);
        assert_eq!(e.suggest_for_product(&p, Some(5)), e.suggest_for_product(&p, Some(5)));
    }
}
