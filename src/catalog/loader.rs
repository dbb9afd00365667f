//! Catalog loading: cache first, full ingestion on a miss
//!
//! ```text
//! compute_signature ──► cache hit? ──yes──► snapshot
//!                            │
//!                            no
//!                            ▼
//!               sample_csv ─► aggregate ─► save ─► snapshot
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use super::cache::CacheStore;
use super::sampler::sample_csv;
use super::signature::{compute_signature, SourceSignature};
use super::stats::aggregate;
use crate::config::CatalogConfig;
use crate::domain::{CatalogSample, CatalogSnapshot};
use crate::error::{Result, WarehouseError};

/// Where a loaded snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Rebuilt,
}

/// Result of [`CatalogLoader::load_or_build`]
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub snapshot: CatalogSnapshot,
    pub outcome: CacheOutcome,
    pub source: PathBuf,
    pub cache_path: PathBuf,
}

/// Ingestion pipeline bound to one cache directory and sample size
pub struct CatalogLoader {
    config: CatalogConfig,
    cache: CacheStore,
}

impl CatalogLoader {
    pub fn new(config: CatalogConfig) -> Self {
        let cache = CacheStore::new(&config.cache_dir);
        Self { config, cache }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn cache_path(&self, source: &Path) -> PathBuf {
        self.cache.path_for(source, self.config.sample_size)
    }

    /// Return the cached snapshot for `source`, rebuilding it when stale or absent
    pub fn load_or_build(&self, source: &Path) -> Result<LoadedCatalog> {
        let signature = compute_signature(source)?;
        let cache_path = self.cache_path(source);

        if let Some(snapshot) = self.cache.load(&cache_path, &signature) {
            info!(
                "Loaded {} products from cache {}",
                snapshot.sample.len(),
                cache_path.display()
            );
            return Ok(LoadedCatalog {
                snapshot,
                outcome: CacheOutcome::Hit,
                source: source.to_path_buf(),
                cache_path,
            });
        }

        self.rebuild_with(source, signature, cache_path)
    }

    /// Ignore any existing cache and re-ingest `source`
    pub fn rebuild(&self, source: &Path) -> Result<LoadedCatalog> {
        let signature = compute_signature(source)?;
        let cache_path = self.cache_path(source);
        self.rebuild_with(source, signature, cache_path)
    }

    fn rebuild_with(
        &self,
        source: &Path,
        signature: SourceSignature,
        cache_path: PathBuf,
    ) -> Result<LoadedCatalog> {
        let snapshot = self.build_snapshot(source, signature)?;

        // A cache we cannot write only costs the next run a re-ingest
        if let Err(e) = self.cache.save(
            &cache_path,
            &snapshot.sample,
            &snapshot.category_stats,
            &snapshot.price_distribution,
            &signature,
        ) {
            warn!("Failed to write catalog cache {}: {}", cache_path.display(), e);
        }

        Ok(LoadedCatalog {
            snapshot,
            outcome: CacheOutcome::Rebuilt,
            source: source.to_path_buf(),
            cache_path,
        })
    }

    /// One streaming pass over `source` plus statistics
    pub fn build_snapshot(
        &self,
        source: &Path,
        signature: SourceSignature,
    ) -> Result<CatalogSnapshot> {
        let started = Instant::now();
        let file = match File::open(source) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WarehouseError::SourceNotFound(source.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (products, ingest) =
            sample_csv(BufReader::new(file), self.config.sample_size, rng)?;

        let sample = CatalogSample {
            products,
            source_signature: signature,
            capacity: self.config.sample_size,
            ingest,
        };
        let (category_stats, price_distribution) = aggregate(&sample);

        info!(
            "Ingested {}: {} rows, kept {}, skipped {} malformed / {} duplicate in {:.2?}",
            source.display(),
            ingest.rows_read,
            sample.len(),
            ingest.malformed_records,
            ingest.duplicate_ids,
            started.elapsed()
        );

        Ok(CatalogSnapshot {
            sample,
            category_stats,
            price_distribution,
        })
    }
}

/// `*.csv` files directly under `data_dir`, sorted by path
pub fn find_csv_files(data_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(data_dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Pick the catalog source in `data_dir`, preferring a file named like `*train*`
pub fn discover_source(data_dir: &Path) -> Result<PathBuf> {
    let files = find_csv_files(data_dir);
    files
        .iter()
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_lowercase().contains("train"))
                .unwrap_or(false)
        })
        .or_else(|| files.first())
        .cloned()
        .ok_or_else(|| WarehouseError::SourceNotFound(data_dir.to_path_buf()))
}
