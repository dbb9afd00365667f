//! Pricing engine settings
//!
//! Flat on purpose: the settings file and `settings set <key> <value>` both
//! address fields by their serde name.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WarehouseError};
use crate::validation::{validate_fraction, validate_non_negative, validate_step_count};

/// Hard upper bound on steps in one run
pub const MAX_STEPS: usize = 1_000;

/// Weights applied to the four reward components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardWeights {
    /// α
    pub profit: f64,
    /// β
    pub competitive: f64,
    /// γ_w
    pub stability: f64,
    /// δ
    pub inventory: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            profit: 0.40,
            competitive: 0.25,
            stability: 0.20,
            inventory: 0.15,
        }
    }
}

/// Engine settings profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Drift step applied in the direction that last paid off
    pub learning_rate: f64,
    /// Discount factor for the cumulative return (0.0 - 1.0)
    pub discount_factor: f64,
    pub profit_weight: f64,
    pub competitive_weight: f64,
    pub stability_weight: f64,
    pub inventory_weight: f64,
    /// Largest allowed price cut per step, as a fraction (-0.15 = -15%)
    pub min_pct: f64,
    /// Largest allowed price rise per step, as a fraction
    pub max_pct: f64,
    /// Initial exploration noise amplitude
    pub exploration_rate: f64,
    /// Per-step multiplicative decay of the exploration amplitude
    pub exploration_decay: f64,
    /// Floor for the decayed exploration amplitude
    pub exploration_min: f64,
    /// Steps used when a run does not ask for a specific count
    pub default_steps: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        let weights = RewardWeights::default();
        Self {
            learning_rate: 0.02,
            discount_factor: 0.99,
            profit_weight: weights.profit,
            competitive_weight: weights.competitive,
            stability_weight: weights.stability,
            inventory_weight: weights.inventory,
            min_pct: -0.15,
            max_pct: 0.15,
            exploration_rate: 0.08,
            exploration_decay: 0.9,
            exploration_min: 0.005,
            default_steps: 30,
        }
    }
}

impl EngineSettings {
    /// Keys accepted by [`EngineSettings::set`], in display order
    pub const KEYS: &'static [&'static str] = &[
        "learning_rate",
        "discount_factor",
        "profit_weight",
        "competitive_weight",
        "stability_weight",
        "inventory_weight",
        "min_pct",
        "max_pct",
        "exploration_rate",
        "exploration_decay",
        "exploration_min",
        "default_steps",
    ];

    pub fn weights(&self) -> RewardWeights {
        RewardWeights {
            profit: self.profit_weight,
            competitive: self.competitive_weight,
            stability: self.stability_weight,
            inventory: self.inventory_weight,
        }
    }

    /// Largest absolute delta a single step may apply
    pub fn max_swing(&self) -> f64 {
        self.min_pct.abs().max(self.max_pct.abs())
    }

    /// Range checks; a run never starts with settings that fail here
    pub fn validate(&self) -> Result<()> {
        validate_non_negative(self.learning_rate, "learning_rate")?;
        validate_fraction(self.discount_factor, "discount_factor")?;
        validate_non_negative(self.profit_weight, "profit_weight")?;
        validate_non_negative(self.competitive_weight, "competitive_weight")?;
        validate_non_negative(self.stability_weight, "stability_weight")?;
        validate_non_negative(self.inventory_weight, "inventory_weight")?;

        if !self.min_pct.is_finite() || !self.max_pct.is_finite() {
            return Err(WarehouseError::InvalidSettings(
                "price bounds must be finite".to_string(),
            ));
        }
        if self.min_pct > 0.0 || self.max_pct < 0.0 {
            return Err(WarehouseError::InvalidSettings(format!(
                "price bounds must satisfy min_pct <= 0 <= max_pct (got {} / {})",
                self.min_pct, self.max_pct
            )));
        }
        if self.min_pct <= -1.0 {
            return Err(WarehouseError::InvalidSettings(format!(
                "min_pct must be greater than -1.0: {}",
                self.min_pct
            )));
        }

        validate_non_negative(self.exploration_rate, "exploration_rate")?;
        validate_fraction(self.exploration_decay, "exploration_decay")?;
        validate_non_negative(self.exploration_min, "exploration_min")?;
        validate_step_count(self.default_steps, MAX_STEPS)?;
        Ok(())
    }

    /// Update one field from its string form
    ///
    /// The result is not validated; callers validate before persisting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if key == "default_steps" {
            self.default_steps = value.parse().map_err(|_| {
                WarehouseError::InvalidSettings(format!(
                    "default_steps must be a whole number: {value}"
                ))
            })?;
            return Ok(());
        }

        let parsed: f64 = value.parse().map_err(|_| {
            WarehouseError::InvalidSettings(format!("{key} must be a number: {value}"))
        })?;
        let slot = match key {
            "learning_rate" => &mut self.learning_rate,
            "discount_factor" => &mut self.discount_factor,
            "profit_weight" | "alpha" => &mut self.profit_weight,
            "competitive_weight" | "beta" => &mut self.competitive_weight,
            "stability_weight" | "gamma" => &mut self.stability_weight,
            "inventory_weight" | "delta" => &mut self.inventory_weight,
            "min_pct" => &mut self.min_pct,
            "max_pct" => &mut self.max_pct,
            "exploration_rate" => &mut self.exploration_rate,
            "exploration_decay" => &mut self.exploration_decay,
            "exploration_min" => &mut self.exploration_min,
            other => {
                return Err(WarehouseError::InvalidSettings(format!(
                    "unknown setting '{other}' (expected one of: {})",
                    Self::KEYS.join(", ")
                )))
            }
        };
        *slot = parsed;
        Ok(())
    }

    /// Current value of one field, formatted for display
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "learning_rate" => self.learning_rate,
            "discount_factor" => self.discount_factor,
            "profit_weight" => self.profit_weight,
            "competitive_weight" => self.competitive_weight,
            "stability_weight" => self.stability_weight,
            "inventory_weight" => self.inventory_weight,
            "min_pct" => self.min_pct,
            "max_pct" => self.max_pct,
            "exploration_rate" => self.exploration_rate,
            "exploration_decay" => self.exploration_decay,
            "exploration_min" => self.exploration_min,
            "default_steps" => return Some(self.default_steps.to_string()),
            _ => return None,
        };
        Some(value.to_string())
    }
}
