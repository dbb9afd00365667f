use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the catalog pipeline and pricing engine
#[derive(Error, Debug)]
pub enum WarehouseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Ingestion errors
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Per-record parse failure. Ingestion logs and counts these, it never returns them.
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Cache errors
    #[error("Cache corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Cache encoding error: {0}")]
    Cache(#[from] bincode::Error),

    // Simulation errors
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for WarehouseError
pub type Result<T> = std::result::Result<T, WarehouseError>;

impl WarehouseError {
    /// Errors the caller can recover from by rebuilding derived data
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WarehouseError::MalformedRecord { .. }
                | WarehouseError::CacheCorrupt(_)
                | WarehouseError::Cache(_)
        )
    }
}
