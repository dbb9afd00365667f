//! On-disk catalog cache
//!
//! A single bincode blob per source holding the sample, its statistics and the
//! signature of the file it was built from. Writes go to a uniquely named temp
//! file in the same directory and are renamed into place, so readers only ever
//! see a complete artifact even when several processes rebuild at once.

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::signature::{is_valid, SourceSignature};
use crate::domain::{CatalogSample, CatalogSnapshot, CategoryStats, PriceDistribution};
use crate::error::{Result, WarehouseError};

/// Bumped whenever the artifact layout changes
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Upper bound on a decoded artifact
const MAX_CACHE_BYTES: u64 = 512 * 1024 * 1024;

const KEY_HEX_LEN: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct CacheArtifact {
    format_version: u32,
    created_at: DateTime<Utc>,
    signature: SourceSignature,
    snapshot: CatalogSnapshot,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_CACHE_BYTES)
}

/// Cache file name for a source: `cache_<12 hex>.bin`
///
/// Keyed by the source path and sample size only, so a rebuild after the source
/// changes overwrites the stale artifact instead of leaving it behind.
pub fn cache_file_name(source: &Path, sample_size: usize) -> String {
    let identity = source
        .canonicalize()
        .unwrap_or_else(|_| source.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(identity.to_string_lossy().as_bytes());
    hasher.update(b"\0");
    hasher.update(sample_size.to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("cache_{}.bin", &digest[..KEY_HEX_LEN])
}

/// Directory-scoped cache store
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache path for a source under this store
    pub fn path_for(&self, source: &Path, sample_size: usize) -> PathBuf {
        self.dir.join(cache_file_name(source, sample_size))
    }

    /// Load a snapshot if a valid cache exists for `current`
    ///
    /// Missing files, signature mismatches, version mismatches and undecodable
    /// files are all reported as a miss.
    pub fn load(&self, cache_path: &Path, current: &SourceSignature) -> Option<CatalogSnapshot> {
        match read_artifact(cache_path) {
            Ok(None) => {
                debug!("No catalog cache at {}", cache_path.display());
                None
            }
            Ok(Some(artifact)) => {
                if artifact.format_version != CACHE_FORMAT_VERSION {
                    info!(
                        "Catalog cache {} has format v{} (want v{}), rebuilding",
                        cache_path.display(),
                        artifact.format_version,
                        CACHE_FORMAT_VERSION
                    );
                    return None;
                }
                if !is_valid(&artifact.signature, current) {
                    info!(
                        "Catalog cache {} is stale ({} != {})",
                        cache_path.display(),
                        artifact.signature,
                        current
                    );
                    return None;
                }
                debug!(
                    "Catalog cache hit: {} products, built {}",
                    artifact.snapshot.sample.len(),
                    artifact.created_at
                );
                Some(artifact.snapshot)
            }
            Err(e) => {
                warn!("Ignoring unreadable catalog cache {}: {}", cache_path.display(), e);
                None
            }
        }
    }

    /// Atomically write a snapshot for `signature`
    pub fn save(
        &self,
        cache_path: &Path,
        sample: &CatalogSample,
        category_stats: &CategoryStats,
        price_distribution: &PriceDistribution,
        signature: &SourceSignature,
    ) -> Result<()> {
        let artifact = CacheArtifact {
            format_version: CACHE_FORMAT_VERSION,
            created_at: Utc::now(),
            signature: *signature,
            snapshot: CatalogSnapshot {
                sample: sample.clone(),
                category_stats: category_stats.clone(),
                price_distribution: *price_distribution,
            },
        };
        let bytes = codec().serialize(&artifact)?;
        write_atomic(cache_path, &bytes)?;
        info!(
            "Wrote catalog cache {} ({} products, {} bytes)",
            cache_path.display(),
            sample.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Remove a cache file; a missing file is not an error
    pub fn invalidate(&self, cache_path: &Path) -> Result<()> {
        match fs::remove_file(cache_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_artifact(path: &Path) -> Result<Option<CacheArtifact>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WarehouseError::Io(e)),
    };
    codec()
        .deserialize(&bytes)
        .map(Some)
        .map_err(|e| WarehouseError::CacheCorrupt(e.to_string()))
}

/// Write to a sibling temp file, fsync, then rename over `path`
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| WarehouseError::Internal(format!("invalid path {}", path.display())))?;
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(
        ".{}.{}.tmp",
        file_name,
        uuid::Uuid::new_v4().simple()
    ));

    let result = (|| -> Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::stats::aggregate;
    use crate::domain::{Category, IngestSummary, Product};

    fn snapshot(signature: SourceSignature) -> CatalogSnapshot {
        let products = (0..5)
            .map(|i| Product {
                id: format!("sku-{i}"),
                price: i as f64 * 2.5,
                name_text: format!("Cold Brew {i}"),
                bullet_points: String::new(),
                description_text: String::new(),
                category: Category::CoffeeTea,
                unit: Some("Ounce".into()),
                value: Some(12.0),
                image_link: None,
            })
            .collect();
        let sample = CatalogSample {
            products,
            source_signature: signature,
            capacity: 10,
            ingest: IngestSummary {
                rows_read: 6,
                valid_records: 5,
                malformed_records: 1,
                duplicate_ids: 0,
            },
        };
        let (category_stats, price_distribution) = aggregate(&sample);
        CatalogSnapshot {
            sample,
            category_stats,
            price_distribution,
        }
    }

    fn save(store: &CacheStore, path: &Path, snap: &CatalogSnapshot, sig: &SourceSignature) {
        store
            .save(
                path,
                &snap.sample,
                &snap.category_stats,
                &snap.price_distribution,
                sig,
            )
            .unwrap();
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let sig = SourceSignature::new(1234, 1_700_000_000, 42);
        let path = dir.path().join("cache_test.bin");
        let snap = snapshot(sig);

        save(&store, &path, &snap, &sig);
        let loaded = store.load(&path, &sig).expect("cache hit");
        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_signature_mismatch_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let sig = SourceSignature::new(1234, 1_700_000_000, 0);
        let path = dir.path().join("cache_test.bin");
        save(&store, &path, &snapshot(sig), &sig);

        let grown = SourceSignature::new(1235, 1_700_000_000, 0);
        let touched = SourceSignature::new(1234, 1_700_000_005, 0);
        assert!(store.load(&path, &grown).is_none());
        assert!(store.load(&path, &touched).is_none());
    }

    #[test]
    fn test_missing_and_corrupt_are_misses() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let sig = SourceSignature::default();
        let path = dir.path().join("cache_test.bin");
        assert!(store.load(&path, &sig).is_none());

        fs::write(&path, b"definitely not bincode").unwrap();
        assert!(store.load(&path, &sig).is_none());
        assert!(matches!(
            read_artifact(&path),
            Err(WarehouseError::CacheCorrupt(_))
        ));
    }

    #[test]
    fn test_truncated_cache_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let sig = SourceSignature::new(10, 10, 10);
        let path = dir.path().join("cache_test.bin");
        save(&store, &path, &snapshot(sig), &sig);

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(store.load(&path, &sig).is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested"));
        let sig = SourceSignature::default();
        let path = store.dir().join("cache_test.bin");
        save(&store, &path, &snapshot(sig), &sig);
        save(&store, &path, &snapshot(sig), &sig);

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cache_test.bin".to_string()]);
    }

    #[test]
    fn test_cache_file_name_is_stable_and_keyed() {
        let a = cache_file_name(Path::new("/data/train.csv"), 10_000);
        assert_eq!(a, cache_file_name(Path::new("/data/train.csv"), 10_000));
        assert_ne!(a, cache_file_name(Path::new("/data/train.csv"), 5_000));
        assert_ne!(a, cache_file_name(Path::new("/data/test.csv"), 10_000));
        assert!(a.starts_with("cache_") && a.ends_with(".bin"));
        assert_eq!(a.len(), "cache_".len() + KEY_HEX_LEN + ".bin".len());
    }

    #[test]
    fn test_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let sig = SourceSignature::default();
        let path = dir.path().join("cache_test.bin");
        save(&store, &path, &snapshot(sig), &sig);
        store.invalidate(&path).unwrap();
        assert!(!path.exists());
        store.invalidate(&path).unwrap();
    }
}
