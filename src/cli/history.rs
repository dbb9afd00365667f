//! `warehouse history` - Past simulation runs

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use super::output;
use super::App;
use crate::domain::format_price;
use crate::persistence::HistoryRecord;

#[derive(Debug, Serialize, Tabled)]
pub struct HistoryRow {
    pub when: String,
    pub product: String,
    pub steps: usize,
    pub initial_price: String,
    pub final_price: String,
    pub change: String,
    pub total_reward: String,
    pub seed: u64,
}

impl From<&HistoryRecord> for HistoryRow {
    fn from(r: &HistoryRecord) -> Self {
        Self {
            when: r.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            product: format!("{} ({})", r.product_name, r.product_id),
            steps: r.steps,
            initial_price: format_price(r.initial_price),
            final_price: format_price(r.final_price),
            change: format!("{:+.2}%", r.price_change_pct),
            total_reward: format!("{:.4}", r.total_reward),
            seed: r.seed,
        }
    }
}

pub fn run(app: &App, limit: usize, clear: bool) -> Result<()> {
    let store = app.history_store();

    if clear {
        if app.mode.is_json() || output::confirm("Delete all recorded simulations?") {
            store.clear()?;
            output::print_success("History cleared");
        } else {
            output::print_warn("Aborted");
        }
        return Ok(());
    }

    let records = store.recent(limit)?;
    if app.mode.is_json() {
        return output::print_json(&records);
    }
    let rows: Vec<HistoryRow> = records.iter().map(HistoryRow::from).collect();
    output::print_items(&rows, app.mode)
}
