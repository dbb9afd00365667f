//! Settings Store
//!
//! Engine settings persisted as a flat TOML table. A missing or unreadable
//! file falls back to defaults; out-of-range values are rejected.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::cache::write_atomic;
use crate::error::Result;
use crate::pricing::EngineSettings;

/// File-backed settings collaborator
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the stored settings
    pub fn load(&self) -> Result<EngineSettings> {
        let settings = self.read()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate then atomically persist
    pub fn save(&self, settings: &EngineSettings) -> Result<()> {
        settings.validate()?;
        let body = toml::to_string_pretty(settings)?;
        write_atomic(&self.path, body.as_bytes())?;
        info!("Saved engine settings to {}", self.path.display());
        Ok(())
    }

    /// Update a single key and persist the result
    pub fn set(&self, key: &str, value: &str) -> Result<EngineSettings> {
        let mut settings = self.read()?;
        settings.set(key, value)?;
        self.save(&settings)?;
        Ok(settings)
    }

    /// Restore and persist the defaults
    pub fn reset(&self) -> Result<EngineSettings> {
        let settings = EngineSettings::default();
        self.save(&settings)?;
        Ok(settings)
    }

    /// Parse without validating, so `set` can repair a bad value
    fn read(&self) -> Result<EngineSettings> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(EngineSettings::default());
            }
            Err(e) => return Err(e.into()),
        };
        match toml::from_str(&body) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(
                    "Ignoring unparseable settings file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(EngineSettings::default())
            }
        }
    }
}
