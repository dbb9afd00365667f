//! Warehouse CLI
//!
//! Commands:
//! - `warehouse ingest` - Build or refresh the catalog cache
//! - `warehouse stats` / `products` - Inspect the cached sample
//! - `warehouse simulate` / `suggest` - Run the pricing engine
//! - `warehouse settings` / `history` - Manage stored settings and past runs

pub mod catalog;
pub mod history;
pub mod output;
pub mod pricing;
pub mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::{discover_source, CatalogLoader, LoadedCatalog};
use crate::config::AppConfig;
use crate::persistence::{HistoryStore, SettingsStore};

pub use output::OutputMode;

/// Catalog sampling cache and dynamic pricing simulator
#[derive(Parser, Debug)]
#[command(name = "warehouse")]
#[command(author, version, about = "Catalog sampling cache and dynamic pricing simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml / <env>.toml (default: ~/.warehouse)
    #[arg(long, global = true, env = "WAREHOUSE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Root all state (cache, settings, history) under this directory
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest the catalog source and build the cache
    Ingest {
        /// Source file (default: discovered in the data directory)
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Ignore any existing cache
        #[arg(long)]
        rebuild: bool,
    },
    /// Category and price statistics for the cached sample
    Stats {
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// List sampled products
    Products {
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Filter by category (e.g. "coffee-tea", "Snacks & Chips")
        #[arg(short, long)]
        category: Option<String>,
        /// Substring search over name and description
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Run a pricing simulation for one product
    Simulate {
        product_id: String,
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Step count (default: from settings)
        #[arg(long)]
        steps: Option<usize>,
        /// Seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Do not record the run in history
        #[arg(long)]
        no_history: bool,
    },
    /// Suggest a next price for one product
    Suggest {
        product_id: String,
        #[arg(short, long)]
        source: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show or change engine settings
    #[command(subcommand)]
    Settings(settings::SettingsCommands),
    /// Show past simulation runs
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Delete all recorded runs
        #[arg(long)]
        clear: bool,
    },
}

/// Resolved configuration plus the collaborators built from it
pub struct App {
    pub config: AppConfig,
    pub mode: OutputMode,
}

impl App {
    /// Load configuration for a parsed command line
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config_dir {
            Some(dir) => AppConfig::load_from(dir),
            None => AppConfig::load(),
        }
        .context("failed to load configuration")?;

        if let Some(root) = &cli.state_dir {
            let rooted = AppConfig::rooted_at(root);
            config.catalog.cache_dir = rooted.catalog.cache_dir;
            config.storage = rooted.storage;
        }

        if let Err(errors) = config.validate() {
            anyhow::bail!("invalid configuration:\n  {}", errors.join("\n  "));
        }

        Ok(Self {
            config,
            mode: OutputMode::from_json_flag(cli.json),
        })
    }

    pub fn loader(&self) -> CatalogLoader {
        CatalogLoader::new(self.config.catalog.clone())
    }

    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(self.config.storage.settings_path())
    }

    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(self.config.storage.history_path())
    }

    /// Explicit source, or the one discovered in the data directory
    pub fn resolve_source(&self, source: Option<&Path>) -> Result<PathBuf> {
        match source {
            Some(path) => Ok(path.to_path_buf()),
            None => discover_source(&self.config.catalog.data_dir).with_context(|| {
                format!(
                    "no catalog source given and none found in {}",
                    self.config.catalog.data_dir.display()
                )
            }),
        }
    }

    /// Load the catalog through the cache
    pub fn load_catalog(&self, source: Option<&Path>, rebuild: bool) -> Result<LoadedCatalog> {
        let source = self.resolve_source(source)?;
        debug!("Using catalog source {}", source.display());
        let loader = self.loader();
        let loaded = if rebuild {
            loader.rebuild(&source)
        } else {
            loader.load_or_build(&source)
        };
        loaded.with_context(|| format!("failed to load catalog from {}", source.display()))
    }
}

/// Dispatch a parsed command
pub fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Ingest { source, rebuild } => catalog::ingest(app, source.as_deref(), rebuild),
        Commands::Stats { source } => catalog::stats(app, source.as_deref()),
        Commands::Products {
            source,
            category,
            search,
            limit,
        } => catalog::products(
            app,
            source.as_deref(),
            category.as_deref(),
            search.as_deref(),
            limit,
        ),
        Commands::Simulate {
            product_id,
            source,
            steps,
            seed,
            no_history,
        } => pricing::simulate(app, &product_id, source.as_deref(), steps, seed, !no_history),
        Commands::Suggest {
            product_id,
            source,
            seed,
        } => pricing::suggest(app, &product_id, source.as_deref(), seed),
        Commands::Settings(cmd) => settings::run(app, cmd),
        Commands::History { limit, clear } => history::run(app, limit, clear),
    }
}
