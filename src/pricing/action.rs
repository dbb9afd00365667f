//! Action Space
//!
//! A pricing action is one signed fractional price change.

use serde::{Deserialize, Serialize};

use super::config::EngineSettings;

/// Prices never drop below this
pub const MIN_PRICE: f64 = 0.01;

/// Signed fractional price delta, already clamped to the configured bounds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingAction {
    pub delta: f64,
}

impl PricingAction {
    /// Leave the price where it is
    pub fn hold() -> Self {
        Self { delta: 0.0 }
    }

    /// Clamp a raw proposal into `[min_pct, max_pct]`
    pub fn clamped(raw: f64, settings: &EngineSettings) -> Self {
        let delta = if raw.is_finite() {
            raw.clamp(settings.min_pct, settings.max_pct)
        } else {
            0.0
        };
        Self { delta }
    }

    /// Price after applying this action to `current`
    pub fn apply(&self, current: f64) -> f64 {
        (current * (1.0 + self.delta)).max(MIN_PRICE)
    }

    /// -1, 0 or 1
    pub fn direction(&self) -> f64 {
        if self.delta > 0.0 {
            1.0
        } else if self.delta < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    pub fn is_hold(&self) -> bool {
        self.delta == 0.0
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        if self.is_hold() {
            "Hold price".to_string()
        } else if self.delta > 0.0 {
            format!("Raise {:.2}%", self.delta * 100.0)
        } else {
            format!("Cut {:.2}%", -self.delta * 100.0)
        }
    }
}
