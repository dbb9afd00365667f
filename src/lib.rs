pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod pricing;
pub mod validation;

pub use catalog::{
    compute_signature, discover_source, is_valid, CacheOutcome, CacheStore, CatalogLoader,
    LoadedCatalog, SourceSignature,
};
pub use config::{AppConfig, CatalogConfig, StorageConfig};
pub use domain::{
    CatalogSample, CatalogSnapshot, Category, CategoryStats, CategorySummary, IngestSummary,
    MarketState, PriceDistribution, Product, SimulationPhase,
};
pub use error::{Result, WarehouseError};
pub use persistence::{HistoryRecord, HistoryStore, SettingsStore};
pub use pricing::{
    EngineSettings, PriceSuggestion, PricingAction, PricingEngine, RewardBreakdown,
    RewardWeights, SimulationResult, SimulationStep,
};
