//! Simulation history
//!
//! A JSON array of run summaries, newest last, capped at [`HISTORY_LIMIT`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::cache::write_atomic;
use crate::error::Result;
use crate::pricing::SimulationResult;

/// Runs kept on disk
pub const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStep {
    pub step: usize,
    pub old_price: f64,
    pub new_price: f64,
    pub reward: f64,
}

/// Summary of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub product_id: String,
    pub product_name: String,
    pub seed: u64,
    pub steps: usize,
    pub discounted_return: f64,
    pub total_reward: f64,
    pub avg_reward: f64,
    pub initial_price: f64,
    pub final_price: f64,
    pub price_change_pct: f64,
    pub trajectory: Vec<HistoryStep>,
}

impl HistoryRecord {
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            product_id: result.product_id.clone(),
            product_name: result.product_name.clone(),
            seed: result.seed,
            steps: result.step_count(),
            discounted_return: result.discounted_return,
            total_reward: result.total_reward,
            avg_reward: result.avg_reward,
            initial_price: result.initial_price,
            final_price: result.final_price,
            price_change_pct: result.price_change_pct(),
            trajectory: result
                .steps
                .iter()
                .map(|s| HistoryStep {
                    step: s.step_index + 1,
                    old_price: s.state_before.current_price,
                    new_price: s.state_after.current_price,
                    reward: s.reward.total,
                })
                .collect(),
        }
    }
}

/// File-backed history collaborator
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_limit(path, HISTORY_LIMIT)
    }

    pub fn with_limit<P: AsRef<Path>>(path: P, limit: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, oldest first; an unreadable file reads as empty
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&body) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Ignoring corrupt history file {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    /// Up to `n` records, newest first
    pub fn recent(&self, n: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self.load()?.into_iter().rev().take(n).collect())
    }

    /// Record a finished run and trim to the limit
    pub fn append(&self, result: &SimulationResult) -> Result<HistoryRecord> {
        let record = HistoryRecord::from_result(result);
        let mut records = self.load()?;
        records.push(record.clone());
        if records.len() > self.limit {
            let excess = records.len() - self.limit;
            records.drain(..excess);
        }
        self.write(&records)?;
        info!(
            "Recorded simulation {} for {} ({} runs kept)",
            record.id,
            record.product_id,
            records.len()
        );
        Ok(record)
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    fn write(&self, records: &[HistoryRecord]) -> Result<()> {
        let body = serde_json::to_vec_pretty(records)?;
        write_atomic(&self.path, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceSignature;
    use crate::domain::{CatalogSample, Category, IngestSummary, Product};
    use crate::pricing::{EngineSettings, PricingEngine};

    fn result(steps: usize, seed: u64) -> SimulationResult {
        let sample = CatalogSample {
            products: vec![Product {
                id: "42".into(),
                price: 5.0,
                name_text: "Trail Mix".into(),
                bullet_points: String::new(),
                description_text: String::new(),
                category: Category::SnacksChips,
                unit: None,
                value: None,
                image_link: None,
            }],
            source_signature: SourceSignature::default(),
            capacity: 1,
            ingest: IngestSummary::default(),
        };
        PricingEngine::new(EngineSettings::default())
            .unwrap()
            .simulate(&sample, "42", steps, Some(seed))
            .unwrap()
    }

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("simulations.json"));
        assert!(store.load().unwrap().is_empty());

        let r = result(5, 1);
        let record = store.append(&r).unwrap();
        assert_eq!(record.steps, 5);
        assert_eq!(record.trajectory.len(), 5);
        assert_eq!(record.trajectory[0].step, 1);
        assert_eq!(record.final_price, r.final_price);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, record.id);
        assert_eq!(loaded[0].product_id, "42");
        assert_eq!(loaded[0].seed, 1);
    }

    #[test]
    fn test_keeps_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::with_limit(dir.path().join("h.json"), 3);
        for seed in 0..5 {
            store.append(&result(1, seed)).unwrap();
        }
        let loaded = store.load().unwrap();
        let seeds: Vec<u64> = loaded.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![2, 3, 4]);

        let recent: Vec<u64> = store.recent(2).unwrap().iter().map(|r| r.seed).collect();
        assert_eq!(recent, vec![4, 3]);
    }

    #[test]
    fn test_clear_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.json"));
        store.append(&result(2, 9)).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());

        std::fs::write(store.path(), "{ nope").unwrap();
        assert!(store.load().unwrap().is_empty());
        store.append(&result(2, 9)).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
