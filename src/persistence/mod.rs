//! File-backed collaborators around the core
//!
//! - Settings store for the engine profile (TOML)
//! - Simulation history (JSON, capped)

pub mod history;
pub mod settings_store;

pub use history::{HistoryRecord, HistoryStep, HistoryStore, HISTORY_LIMIT};
pub use settings_store::SettingsStore;
