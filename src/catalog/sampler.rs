//! Reservoir sampling over a record stream
//!
//! One forward pass, memory bounded by the reservoir capacity. After `n` valid
//! records every one of them is in the reservoir with probability `capacity / n`,
//! so category proportions in the sample track the source in expectation.
//!
//! Malformed records and records whose id is already held in the reservoir are
//! counted and skipped without advancing the stream position.

use rand::Rng;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, warn};

use super::record::Columns;
use crate::domain::{IngestSummary, Product};
use crate::error::{Result, WarehouseError};

/// Fixed-capacity uniform sampler
pub struct ReservoirSampler<R> {
    capacity: usize,
    rng: R,
    reservoir: Vec<Product>,
    /// Product id to reservoir slot
    slots: HashMap<String, usize>,
    /// Valid, non-duplicate records offered so far
    seen: u64,
    summary: IngestSummary,
}

impl<R: Rng> ReservoirSampler<R> {
    pub fn new(capacity: usize, rng: R) -> Self {
        Self {
            capacity,
            rng,
            reservoir: Vec::with_capacity(capacity.min(1 << 16)),
            slots: HashMap::with_capacity(capacity.min(1 << 16)),
            seen: 0,
            summary: IngestSummary::default(),
        }
    }

    /// Offer one parsed record; returns whether it entered the reservoir
    pub fn offer(&mut self, product: Product) -> bool {
        self.summary.rows_read += 1;

        if self.slots.contains_key(&product.id) {
            self.summary.duplicate_ids += 1;
            debug!(id = %product.id, "skipping duplicate product id");
            return false;
        }

        self.summary.valid_records += 1;
        self.seen += 1;

        if self.reservoir.len() < self.capacity {
            self.slots.insert(product.id.clone(), self.reservoir.len());
            self.reservoir.push(product);
            return true;
        }

        // Uniform j in [0, seen); replace only when j lands inside the reservoir
        let j = self.rng.gen_range(0..self.seen);
        if j < self.capacity as u64 {
            let slot = j as usize;
            let evicted = std::mem::replace(&mut self.reservoir[slot], product);
            self.slots.remove(&evicted.id);
            self.slots.insert(self.reservoir[slot].id.clone(), slot);
            true
        } else {
            false
        }
    }

    /// Count a record that failed to parse
    pub fn reject(&mut self, err: &WarehouseError) {
        self.summary.rows_read += 1;
        self.summary.malformed_records += 1;
        debug!("skipping record: {}", err);
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    pub fn finish(self) -> (Vec<Product>, IngestSummary) {
        (self.reservoir, self.summary)
    }
}

/// Sample from an iterator of parse outcomes
pub fn sample<I, R>(records: I, capacity: usize, rng: R) -> (Vec<Product>, IngestSummary)
where
    I: IntoIterator<Item = Result<Product>>,
    R: Rng,
{
    let mut sampler = ReservoirSampler::new(capacity, rng);
    for record in records {
        match record {
            Ok(product) => {
                sampler.offer(product);
            }
            Err(e) => sampler.reject(&e),
        }
    }
    sampler.finish()
}

/// Stream a delimited catalog through the sampler
///
/// Only I/O failures abort the pass; anything wrong with an individual row is
/// counted as malformed.
pub fn sample_csv<Src, R>(source: Src, capacity: usize, rng: R) -> Result<(Vec<Product>, IngestSummary)>
where
    Src: Read,
    R: Rng,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(source);

    let columns = Columns::from_headers(reader.byte_headers()?);
    let missing = columns.missing_required();
    if !missing.is_empty() {
        warn!(
            "catalog header is missing required columns {:?}; every row will be skipped",
            missing
        );
    }

    let mut sampler = ReservoirSampler::new(capacity, rng);
    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                match columns.parse(&record, line) {
                    Ok(product) => {
                        sampler.offer(product);
                    }
                    Err(e) => sampler.reject(&e),
                }
            }
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                sampler.reject(&WarehouseError::MalformedRecord {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(sampler.finish())
}
