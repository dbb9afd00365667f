use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::validation::validate_sample_size;

/// Default reservoir size
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Directory searched for `*.csv` sources when none is given
    pub data_dir: PathBuf,
    /// Where cache artifacts are written
    pub cache_dir: PathBuf,
    /// Reservoir size
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Fixed sampling seed; random per rebuild when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_dir: state_dir(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    /// Holds the settings file and simulation history
    pub state_dir: PathBuf,
}

impl StorageConfig {
    pub fn settings_path(&self) -> PathBuf {
        self.state_dir.join("settings.toml")
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join("simulations.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: state_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily log files; console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

/// Per-user state directory, `~/.warehouse`
pub fn state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".warehouse")
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(state_dir())
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Self::default();
        let env_name = std::env::var("WAREHOUSE_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            // Start with default values
            .set_default("catalog.data_dir", path_str(&defaults.catalog.data_dir))?
            .set_default("catalog.cache_dir", path_str(&defaults.catalog.cache_dir))?
            .set_default("catalog.sample_size", DEFAULT_SAMPLE_SIZE as u64)?
            .set_default("storage.state_dir", path_str(&defaults.storage.state_dir))?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., ~/.warehouse/production.toml)
            .add_source(File::from(config_dir.join(format!("{env_name}.toml"))).required(false))
            // Override with environment variables (WAREHOUSE__CATALOG__SAMPLE_SIZE, etc.)
            .add_source(
                Environment::with_prefix("WAREHOUSE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Everything rooted under one directory; used by tests and `--state-dir`
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            catalog: CatalogConfig {
                data_dir: root.join("data"),
                cache_dir: root.to_path_buf(),
                ..CatalogConfig::default()
            },
            storage: StorageConfig {
                state_dir: root.to_path_buf(),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_sample_size(self.catalog.sample_size) {
            errors.push(format!("catalog.sample_size: {e}"));
        }

        if self.catalog.cache_dir.as_os_str().is_empty() {
            errors.push("catalog.cache_dir must not be empty".to_string());
        }

        if self.storage.state_dir.as_os_str().is_empty() {
            errors.push("storage.state_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.sample_size, DEFAULT_SAMPLE_SIZE);
        assert!(config.catalog.seed.is_none());
        assert!(config.validate().is_ok());
        assert!(config.storage.settings_path().ends_with(".warehouse/settings.toml"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[catalog]\nsample_size = 250\nseed = 9\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.catalog.sample_size, 250);
        assert_eq!(config.catalog.seed, Some(9));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_rooted_at() {
        let config = AppConfig::rooted_at("/tmp/wh");
        assert_eq!(config.catalog.cache_dir, PathBuf::from("/tmp/wh"));
        assert_eq!(
            config.storage.history_path(),
            PathBuf::from("/tmp/wh/simulations.json")
        );
    }

    #[test]
    fn test_validate_rejects_zero_sample() {
        let mut config = AppConfig::default();
        config.catalog.sample_size = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}
