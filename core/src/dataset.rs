//! The canonical generated dataset.
//!
//! RULE: A Dataset is immutable after construction. It exposes only
//! shared slices; filtering and price shifts work on cloned records.

use crate::{
    catalog::Catalog,
    config::{GenerationParams, SamplingProfile},
    derivation::{derive_records, PopulationStats},
    generator::generate_sales,
    record::TransactionRecord,
    rng::{FieldSlot, RngBank},
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Dataset {
    id: Uuid,
    params: GenerationParams,
    population: PopulationStats,
    catalog: Arc<Catalog>,
    records: Vec<TransactionRecord>,
}

impl Dataset {
    /// Seeded identifier: equal params give equal ids.
    pub fn id(&self) -> Uuid { self.id }
    pub fn params(&self) -> &GenerationParams { &self.params }
    /// Gross-revenue stats of the full population, as used for z-scores.
    pub fn population(&self) -> &PopulationStats { &self.population }
    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub(crate) fn shared_catalog(&self) -> Arc<Catalog> { Arc::clone(&self.catalog) }
    pub fn records(&self) -> &[TransactionRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

/// Generate and derive a full dataset. Not memoized: see `DatasetCache`.
pub fn generate(
    params: &GenerationParams,
    profile: &SamplingProfile,
    catalog: Arc<Catalog>,
) -> Dataset {
    let sales = generate_sales(params, profile, &catalog);
    let (records, population) = derive_records(sales);

    let id = dataset_id(params);

    log::info!(
        "generated dataset {id}: {} records, seed={}, window={}..{}, revenue mean={:.2} sd={:.2}",
        records.len(),
        params.seed(),
        params.start(),
        params.end(),
        population.mean,
        population.std_dev
    );

    Dataset { id, params: *params, population, catalog, records }
}

/// Seed stream bytes salted with the rest of the key, so datasets that
/// share a seed but differ in size or window get distinct ids.
fn dataset_id(params: &GenerationParams) -> Uuid {
    let mut bytes = RngBank::new(params.seed())
        .for_field(FieldSlot::DatasetId)
        .next_bytes16();
    let window_salt = params.window_seconds() ^ params.start().and_utc().timestamp() as u64;
    let salt = (params.record_count() as u64)
        .to_be_bytes()
        .into_iter()
        .chain(window_salt.to_be_bytes());
    for (b, s) in bytes.iter_mut().zip(salt) {
        *b ^= s;
    }
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}
