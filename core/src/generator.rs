//! Synthetic sale generation.
//!
//! RULES:
//!   - Every dimension draws from its own RngBank stream, one draw
//!     per record in record order, so output is reproducible bit for bit.
//!   - Catalog sampling is hierarchical: category, then a model of that
//!     category, then a color of that model. Never a flattened list.
//!   - Timestamps are uniform offsets inside the window, not sorted.

use crate::{
    catalog::Catalog,
    config::{GenerationParams, SamplingProfile},
    dimensions::Team,
    record::Sale,
    rng::{FieldRng, FieldSlot, RngBank},
};
use chrono::Duration;

struct SaleSampler<'a> {
    params: &'a GenerationParams,
    profile: &'a SamplingProfile,
    catalog: &'a Catalog,
    timestamp: FieldRng,
    theater: FieldRng,
    product: FieldRng,
    channel: FieldRng,
    team: FieldRng,
    units: FieldRng,
    inventory: FieldRng,
    rating: FieldRng,
}

impl<'a> SaleSampler<'a> {
    fn new(params: &'a GenerationParams, profile: &'a SamplingProfile, catalog: &'a Catalog) -> Self {
        let bank = RngBank::new(params.seed());
        Self {
            params,
            profile,
            catalog,
            timestamp: bank.for_field(FieldSlot::Timestamp),
            theater:   bank.for_field(FieldSlot::Theater),
            product:   bank.for_field(FieldSlot::Catalog),
            channel:   bank.for_field(FieldSlot::Channel),
            team:      bank.for_field(FieldSlot::Team),
            units:     bank.for_field(FieldSlot::Units),
            inventory: bank.for_field(FieldSlot::Inventory),
            rating:    bank.for_field(FieldSlot::Rating),
        }
    }

    fn sample(&mut self, index: usize) -> Sale {
        let profile = self.profile;

        let offset = self.timestamp.next_u64_below(self.params.window_seconds());
        let timestamp = self.params.start() + Duration::seconds(offset as i64);

        let theater = profile.theaters[self.theater.weighted_index(&profile.theater_weights)];

        let categories = self.catalog.categories();
        let category = &categories[pick(&mut self.product, categories.len())];
        let model = &category.models[pick(&mut self.product, category.models.len())];
        let color = &model.colors[pick(&mut self.product, model.colors.len())];

        let channel = profile.channels[self.channel.weighted_index(&profile.channel_weights)];
        let team = Team(1 + self.team.next_u64_below(profile.team_count as u64) as u16);

        let units_sold = self
            .units
            .uniform_inclusive(profile.units.min as u64, profile.units.max as u64) as u32;
        let inventory_on_hand = self
            .inventory
            .uniform_inclusive(profile.inventory.min as u64, profile.inventory.max as u64)
            as u32;
        let customer_rating = self.rating.uniform_f64(profile.rating.min, profile.rating.max);

        Sale {
            transaction_id: format!("{}-{index:06}", profile.id_prefix),
            timestamp,
            theater,
            category: category.name.clone(),
            model: model.name.clone(),
            color: color.clone(),
            channel,
            team,
            units_sold,
            base_price: model.base_price,
            manufacturing_cost: model.base_price * profile.cost_ratio,
            inventory_on_hand,
            customer_rating,
        }
    }
}

fn pick(rng: &mut FieldRng, len: usize) -> usize {
    rng.next_u64_below(len as u64) as usize
}

/// Produce exactly `params.record_count()` sales.
/// Callers validate params, profile and catalog first.
pub fn generate_sales(
    params: &GenerationParams,
    profile: &SamplingProfile,
    catalog: &Catalog,
) -> Vec<Sale> {
    let mut sampler = SaleSampler::new(params, profile, catalog);
    (0..params.record_count()).map(|i| sampler.sample(i)).collect()
}
