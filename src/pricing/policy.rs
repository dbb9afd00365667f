//! Hill-climbing price policy
//!
//! Each proposal is decaying uniform noise plus a drift of `learning_rate` in
//! whichever direction last beat holding the price. There is no learned state
//! beyond that one direction.

use rand::Rng;

use super::action::PricingAction;
use super::config::EngineSettings;

#[derive(Debug, Clone)]
pub struct HillClimbPolicy {
    learning_rate: f64,
    exploration_rate: f64,
    exploration_decay: f64,
    exploration_min: f64,
    /// -1, 0 or 1; zero until the first observation
    bias: f64,
}

impl HillClimbPolicy {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            learning_rate: settings.learning_rate,
            exploration_rate: settings.exploration_rate,
            exploration_decay: settings.exploration_decay,
            exploration_min: settings.exploration_min,
            bias: 0.0,
        }
    }

    /// Noise amplitude at `step`
    pub fn exploration_scale(&self, step: usize) -> f64 {
        let exponent = i32::try_from(step).unwrap_or(i32::MAX);
        (self.exploration_rate * self.exploration_decay.powi(exponent)).max(self.exploration_min)
    }

    /// Current drift direction
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Raw, unclamped delta for `step`
    ///
    /// Always draws exactly one value from `rng` so runs stay reproducible.
    pub fn propose<R: Rng>(&self, step: usize, rng: &mut R) -> f64 {
        let noise = rng.gen_range(-1.0f64..=1.0) * self.exploration_scale(step);
        noise + self.learning_rate * self.bias
    }

    /// Feed back the reward of the taken action against holding the price
    pub fn observe(&mut self, action: &PricingAction, taken_reward: f64, hold_reward: f64) {
        let direction = action.direction();
        self.bias = if direction == 0.0 {
            0.0
        } else if taken_reward >= hold_reward {
            direction
        } else {
            -direction
        };
    }
}
