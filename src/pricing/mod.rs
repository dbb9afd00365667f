//! Dynamic pricing simulation
//!
//! A seeded, single-run heuristic search over price moves for one product.
//! Not a trainer: the policy keeps only the direction that last paid off.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ HillClimbPolicy│──►│ PricingAction │──►│SimulatedMarket│
//! └───────▲────────┘   └───────────────┘   └──────┬───────┘
//!         │                                       │
//!         │            ┌───────────────┐          │
//!         └────────────│ PricingReward │◄─────────┘
//!                      └───────────────┘
//! ```

pub mod action;
pub mod config;
pub mod engine;
pub mod market;
pub mod policy;
pub mod reward;

pub use action::{PricingAction, MIN_PRICE};
pub use config::{EngineSettings, RewardWeights, MAX_STEPS};
pub use engine::{PriceSuggestion, PricingEngine, SimulationResult, SimulationStep};
pub use market::{MarketConfig, SimulatedMarket};
pub use policy::HillClimbPolicy;
pub use reward::{PriceTransition, PricingReward, RewardBreakdown, RewardFunction};
