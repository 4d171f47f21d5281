//! Memoized dataset generation.
//!
//! One cache belongs to one (profile, catalog) pair, so the full
//! generation key is `GenerationParams`. Entries are never mutated;
//! callers share them through `Arc`.

use crate::{
    catalog::Catalog,
    config::{GenerationParams, SamplingProfile},
    dataset::{generate, Dataset},
};
use std::collections::HashMap;
use std::sync::Arc;

pub struct DatasetCache {
    profile: SamplingProfile,
    catalog: Arc<Catalog>,
    entries: HashMap<GenerationParams, Arc<Dataset>>,
    hits: u64,
    misses: u64,
}

impl DatasetCache {
    pub fn new(profile: SamplingProfile, catalog: Catalog) -> Self {
        Self {
            profile,
            catalog: Arc::new(catalog),
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached dataset for `params`, generating it on first use.
    pub fn get_or_generate(&mut self, params: &GenerationParams) -> Arc<Dataset> {
        if let Some(existing) = self.entries.get(params) {
            self.hits += 1;
            log::debug!("dataset cache hit: seed={} n={}", params.seed(), params.record_count());
            return Arc::clone(existing);
        }
        self.misses += 1;
        log::debug!("dataset cache miss: seed={} n={}", params.seed(), params.record_count());
        let dataset = Arc::new(generate(params, &self.profile, Arc::clone(&self.catalog)));
        self.entries.insert(*params, Arc::clone(&dataset));
        dataset
    }

    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn profile(&self) -> &SamplingProfile { &self.profile }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn hits(&self) -> u64 { self.hits }
    pub fn misses(&self) -> u64 { self.misses }

    /// Drop every entry. Outstanding `Arc`s stay valid.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
