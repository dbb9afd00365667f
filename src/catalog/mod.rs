//! Catalog ingestion pipeline
//!
//! Turns an arbitrarily large delimited catalog into a bounded, uniformly sampled
//! dataset with precomputed statistics, cached on disk and keyed by the source
//! file's signature.
//!
//! - [`signature`]: size + mtime identity of the source, gates cache validity
//! - [`sampler`]: single-pass reservoir sampling
//! - [`stats`]: category and price aggregates
//! - [`cache`]: atomic bincode persistence
//! - [`loader`]: glue, cache first and ingestion on a miss

pub mod cache;
pub mod classify;
pub mod loader;
pub mod record;
pub mod sampler;
pub mod signature;
pub mod stats;

pub use cache::{cache_file_name, CacheStore, CACHE_FORMAT_VERSION};
pub use classify::{classify, classify_product, CATEGORY_RULES};
pub use loader::{discover_source, find_csv_files, CacheOutcome, CatalogLoader, LoadedCatalog};
pub use record::{parse_catalog_content, CatalogText, Columns};
pub use sampler::{sample, sample_csv, ReservoirSampler};
pub use signature::{compute_signature, is_valid, SourceSignature};
pub use stats::{aggregate, price_distribution};
