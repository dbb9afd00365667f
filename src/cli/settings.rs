//! `warehouse settings` - Engine settings management

use anyhow::Result;
use clap::Subcommand;

use super::output::{self, FieldRow};
use super::App;
use crate::pricing::EngineSettings;

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set one value (e.g. `settings set profit_weight 0.5`)
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
}

fn print_settings(settings: &EngineSettings, app: &App) -> Result<()> {
    if app.mode.is_json() {
        return output::print_json(settings);
    }
    let rows: Vec<FieldRow> = EngineSettings::KEYS
        .iter()
        .map(|key| FieldRow::new(key, settings.get(key).unwrap_or_default()))
        .collect();
    output::print_fields(&rows);
    Ok(())
}

pub fn run(app: &App, cmd: SettingsCommands) -> Result<()> {
    let store = app.settings_store();
    match cmd {
        SettingsCommands::Show => {
            let settings = store.load()?;
            print_settings(&settings, app)?;
            if !app.mode.is_json() {
                println!("({})", store.path().display());
            }
        }
        SettingsCommands::Set { key, value } => {
            let settings = store.set(&key, &value)?;
            if !app.mode.is_json() {
                output::print_success(&format!("{key} = {value}"));
            }
            print_settings(&settings, app)?;
        }
        SettingsCommands::Reset => {
            let settings = store.reset()?;
            if !app.mode.is_json() {
                output::print_success("Settings reset to defaults");
            }
            print_settings(&settings, app)?;
        }
    }
    Ok(())
}
