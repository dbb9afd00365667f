//! `warehouse simulate | suggest`

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::output::{self, FieldRow};
use super::App;
use crate::domain::format_price;
use crate::error::WarehouseError;
use crate::pricing::{PricingEngine, SimulationResult, SimulationStep};

#[derive(Debug, Serialize, Tabled)]
pub struct StepRow {
    pub step: usize,
    pub old_price: String,
    pub action: String,
    pub new_price: String,
    pub demand: String,
    pub profit: String,
    pub competitive: String,
    pub stability: String,
    pub inventory: String,
    pub reward: String,
}

impl From<&SimulationStep> for StepRow {
    fn from(s: &SimulationStep) -> Self {
        Self {
            step: s.step_index + 1,
            old_price: format_price(s.state_before.current_price),
            action: s.action.description(),
            new_price: format_price(s.state_after.current_price),
            demand: format!("{:.1}", s.demand),
            profit: format!("{:.4}", s.reward.profit),
            competitive: format!("{:.4}", s.reward.competitive),
            stability: format!("{:.4}", s.reward.stability),
            inventory: format!("{:.4}", s.reward.inventory),
            reward: format!("{:.4}", s.reward.total),
        }
    }
}

fn engine(app: &App) -> Result<PricingEngine> {
    let settings = app
        .settings_store()
        .load()
        .context("failed to load engine settings")?;
    Ok(PricingEngine::new(settings)?)
}

fn not_found(err: WarehouseError, product_id: &str) -> anyhow::Error {
    match err {
        WarehouseError::ProductNotFound(_) => anyhow::anyhow!(
            "product '{product_id}' is not in the sampled catalog (try `warehouse products --search ...`)"
        ),
        other => other.into(),
    }
}

pub fn simulate(
    app: &App,
    product_id: &str,
    source: Option<&Path>,
    steps: Option<usize>,
    seed: Option<u64>,
    record: bool,
) -> Result<()> {
    let engine = engine(app)?;
    let steps = steps.unwrap_or(engine.settings().default_steps);
    let loaded = app.load_catalog(source, false)?;

    let result = engine
        .simulate(&loaded.snapshot.sample, product_id, steps, seed)
        .map_err(|e| not_found(e, product_id))?;

    if record {
        app.history_store()
            .append(&result)
            .context("failed to record simulation history")?;
    }

    if app.mode.is_json() {
        return output::print_json(&result);
    }
    print_result(&result, app)
}

fn print_result(result: &SimulationResult, app: &App) -> Result<()> {
    let rows: Vec<StepRow> = result.steps.iter().map(StepRow::from).collect();
    output::print_heading(&format!(
        "Simulation: {} ({})",
        result.product_name, result.product_id
    ));
    output::print_items(&rows, app.mode)?;

    output::print_heading("Summary");
    output::print_fields(&[
        FieldRow::new("steps", result.step_count()),
        FieldRow::new("seed", result.seed),
        FieldRow::new("initial price", format_price(result.initial_price)),
        FieldRow::new("final price", format_price(result.final_price)),
        FieldRow::new("price change", format!("{:+.2}%", result.price_change_pct())),
        FieldRow::new(
            "price range",
            format!(
                "{} - {}",
                format_price(result.min_price),
                format_price(result.max_price)
            ),
        ),
        FieldRow::new("total reward", format!("{:.4}", result.total_reward)),
        FieldRow::new("avg reward", format!("{:.4}", result.avg_reward)),
        FieldRow::new("discounted return", format!("{:.4}", result.discounted_return)),
    ]);
    Ok(())
}

pub fn suggest(app: &App, product_id: &str, source: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let engine = engine(app)?;
    let loaded = app.load_catalog(source, false)?;
    let product = loaded
        .snapshot
        .sample
        .product(product_id)
        .ok_or_else(|| not_found(WarehouseError::ProductNotFound(product_id.into()), product_id))?;

    let (market, suggestion) = engine.suggest_for_product(product, seed);

    if app.mode.is_json() {
        return output::print_json(&serde_json::json!({
            "product_id": product.id,
            "market": market,
            "suggestion": suggestion,
        }));
    }

    output::print_heading(&format!("Suggestion: {} ({})", product.display_name(), product.id));
    output::print_fields(&[
        FieldRow::new("current price", format_price(suggestion.current_price)),
        FieldRow::new("competitor price", format_price(market.competitor_price)),
        FieldRow::new("inventory", format!("{:.0}", market.inventory_level)),
        FieldRow::new("engagement", format!("{:.2}", market.engagement)),
        FieldRow::new("seasonal factor", format!("{:.2}", market.seasonal_factor)),
        FieldRow::new("elasticity", format!("{:.2}", market.demand_elasticity)),
        FieldRow::new("suggested price", format_price(suggestion.suggested_price)),
        FieldRow::new("action", suggestion.action.description()),
        FieldRow::new("expected reward", format!("{:.4}", suggestion.reward.total)),
    ]);
    Ok(())
}
