//! Filter engine.
//!
//! Semantics:
//!   - AND across dimensions, OR within one dimension's selected set.
//!   - An empty selection means "every value allowed" on that axis.
//!     This is `resolve_effective_domain`; nothing else decides it.
//!   - Model and color selections cascade from the category selection.
//!     A selected model the catalog knows but the selected categories
//!     cannot reach is stale and silently dropped. A name the catalog
//!     has never heard of is kept and simply matches nothing.
//!   - Output is always an owned copy of the matching records, carried
//!     as a `Selection` that keeps the source dataset's population stats
//!     and catalog.

use crate::{
    catalog::Catalog,
    classifier::Chipset,
    dataset::Dataset,
    derivation::PopulationStats,
    dimensions::{SalesChannel, Team, Theater},
    error::{DashError, DashResult},
    record::TransactionRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

/// Inclusive calendar-date range over the record timestamp.
/// An inverted range matches nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whole calendar years, `first..=last`.
    pub fn years(first: i32, last: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(first, 1, 1)?,
            end: NaiveDate::from_ymd_opt(last, 12, 31)?,
        })
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        let d = ts.date();
        self.start <= d && d <= self.end
    }
}

/// Raw selections, exactly as the dashboard controls hold them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterCriteria {
    pub theaters: BTreeSet<Theater>,
    pub categories: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub chipsets: BTreeSet<Chipset>,
    pub channels: BTreeSet<SalesChannel>,
    pub teams: BTreeSet<Team>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// No selection on any axis: the identity filter.
    pub fn all() -> Self {
        Self::default()
    }
}

/// The effective value domain of one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain<T> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Domain<T> {
    pub fn allows(&self, value: &T) -> bool {
        match self {
            Domain::All => true,
            Domain::Only(set) => set.contains(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Domain::All)
    }
}

/// Empty selection = all values allowed. Non-empty = exactly those values.
pub fn resolve_effective_domain<T: Ord + Clone>(selected: &BTreeSet<T>) -> Domain<T> {
    if selected.is_empty() {
        Domain::All
    } else {
        Domain::Only(selected.clone())
    }
}

/// Models reachable from the category domain.
pub fn legal_models(catalog: &Catalog, categories: &Domain<String>) -> BTreeSet<String> {
    catalog
        .categories()
        .iter()
        .filter(|c| categories.allows(&c.name))
        .flat_map(|c| c.models.iter().map(|m| m.name.clone()))
        .collect()
}

/// Colors reachable from the category and model domains.
pub fn legal_colors(
    catalog: &Catalog,
    categories: &Domain<String>,
    models: &Domain<String>,
) -> BTreeSet<String> {
    catalog
        .categories()
        .iter()
        .filter(|c| categories.allows(&c.name))
        .flat_map(|c| c.models.iter())
        .filter(|m| models.allows(&m.name))
        .flat_map(|m| m.colors.iter().cloned())
        .collect()
}

fn cascade(
    axis: &'static str,
    selected: &BTreeSet<String>,
    reachable: &BTreeSet<String>,
    known: impl Fn(&str) -> bool,
) -> Domain<String> {
    let (kept, stale): (BTreeSet<String>, BTreeSet<String>) = selected
        .iter()
        .cloned()
        .partition(|v| reachable.contains(v) || !known(v));
    if !stale.is_empty() {
        log::debug!("dropping stale {axis} selections: {stale:?}");
    }
    resolve_effective_domain(&kept)
}

/// Criteria with the empty-means-all policy and the cascade applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub theaters: Domain<Theater>,
    pub categories: Domain<String>,
    pub models: Domain<String>,
    pub colors: Domain<String>,
    pub chipsets: Domain<Chipset>,
    pub channels: Domain<SalesChannel>,
    pub teams: Domain<Team>,
    pub date_range: Option<DateRange>,
}

impl ResolvedFilter {
    pub fn resolve(criteria: &FilterCriteria, catalog: &Catalog) -> Self {
        let categories = resolve_effective_domain(&criteria.categories);
        let models = cascade(
            "model",
            &criteria.models,
            &legal_models(catalog, &categories),
            |m| catalog.knows_model(m),
        );
        let colors = cascade(
            "color",
            &criteria.colors,
            &legal_colors(catalog, &categories, &models),
            |c| catalog.knows_color(c),
        );
        Self {
            theaters: resolve_effective_domain(&criteria.theaters),
            categories,
            models,
            colors,
            chipsets: resolve_effective_domain(&criteria.chipsets),
            channels: resolve_effective_domain(&criteria.channels),
            teams: resolve_effective_domain(&criteria.teams),
            date_range: criteria.date_range,
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let sale = &record.sale();
        self.theaters.allows(&sale.theater)
            && self.categories.allows(&sale.category)
            && self.models.allows(&sale.model)
            && self.colors.allows(&sale.color)
            && self.chipsets.allows(&record.chipset())
            && self.channels.allows(&sale.channel)
            && self.teams.allows(&sale.team)
            && self.date_range.map_or(true, |r| r.contains(&sale.timestamp))
    }
}

/// Filter records against a catalog. Returns owned copies.
pub fn filter_records(
    records: &[TransactionRecord],
    catalog: &Catalog,
    criteria: &FilterCriteria,
) -> Vec<TransactionRecord> {
    let resolved = ResolvedFilter::resolve(criteria, catalog);
    let out: Vec<TransactionRecord> = records
        .iter()
        .filter(|r| resolved.matches(r))
        .cloned()
        .collect();
    log::debug!("filter kept {} of {} records", out.len(), records.len());
    out
}

/// Filter the canonical dataset into an owned `Selection`.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Selection {
    Selection {
        dataset_id: dataset.id(),
        population: *dataset.population(),
        catalog: dataset.shared_catalog(),
        price_shift: PriceShift::none(),
        records: filter_records(dataset.records(), dataset.catalog(), criteria),
    }
}

/// A filtered, materialized copy of a dataset.
///
/// Derefs to the record slice, so every analytics view accepts it
/// directly. `population()` is the source dataset's, which is what the
/// stored z-scores were computed against.
#[derive(Debug, Clone)]
pub struct Selection {
    dataset_id: Uuid,
    population: PopulationStats,
    catalog: Arc<Catalog>,
    price_shift: PriceShift,
    records: Vec<TransactionRecord>,
}

impl Selection {
    pub fn dataset_id(&self) -> Uuid { self.dataset_id }
    pub fn population(&self) -> &PopulationStats { &self.population }
    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn price_shift(&self) -> PriceShift { self.price_shift }
    pub fn records(&self) -> &[TransactionRecord] { &self.records }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }

    /// Re-price the selection. Shifts replace each other rather than
    /// compound: revenue is always generation-time revenue × `shift`.
    pub fn with_price_shift(mut self, shift: PriceShift) -> Self {
        let relative = PriceShift {
            percent: (shift.factor() / self.price_shift.factor() - 1.0) * 100.0,
        };
        self.records = apply_price_shift(self.records, relative);
        self.price_shift = shift;
        self
    }
}

impl Deref for Selection {
    type Target = [TransactionRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// The values each control may currently offer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilterOptions {
    pub theaters: Vec<Theater>,
    pub categories: Vec<String>,
    pub models: Vec<String>,
    pub colors: Vec<String>,
    pub chipsets: Vec<Chipset>,
    pub channels: Vec<SalesChannel>,
    pub teams: Vec<Team>,
}

/// Theaters, chipsets, channels and teams are offered as present in the
/// dataset; models and colors as reachable from the current selection.
pub fn filter_options(dataset: &Dataset, criteria: &FilterCriteria) -> FilterOptions {
    let records = dataset.records();
    let categories = resolve_effective_domain(&criteria.categories);
    let resolved = ResolvedFilter::resolve(criteria, dataset.catalog());
    FilterOptions {
        theaters: present(records, |r| r.sale().theater),
        categories: dataset.catalog().category_names(),
        models: legal_models(dataset.catalog(), &categories).into_iter().collect(),
        colors: legal_colors(dataset.catalog(), &categories, &resolved.models)
            .into_iter()
            .collect(),
        chipsets: present(records, |r| r.chipset()),
        channels: present(records, |r| r.sale().channel),
        teams: present(records, |r| r.sale().team),
    }
}

fn present<T: Ord>(records: &[TransactionRecord], key: impl Fn(&TransactionRecord) -> T) -> Vec<T> {
    records.iter().map(key).collect::<BTreeSet<T>>().into_iter().collect()
}

/// Percentage shift applied to gross revenue after filtering.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PriceShift {
    percent: f64,
}

impl PriceShift {
    pub fn none() -> Self {
        Self { percent: 0.0 }
    }

    /// Rejects non-finite shifts and shifts that would wipe out revenue.
    pub fn percent(percent: f64) -> DashResult<Self> {
        if !percent.is_finite() || percent <= -100.0 {
            return Err(DashError::InvalidControl { control: "price_shift", value: percent });
        }
        Ok(Self { percent })
    }

    pub fn as_percent(&self) -> f64 { self.percent }

    pub fn factor(&self) -> f64 {
        1.0 + self.percent / 100.0
    }
}

/// Scale gross revenue of already-filtered copies.
///
/// Net profit, lead digit and z-score keep their generation-time values,
/// so after a shift the z-score no longer matches the shifted revenue.
pub fn apply_price_shift(
    mut records: Vec<TransactionRecord>,
    shift: PriceShift,
) -> Vec<TransactionRecord> {
    let factor = shift.factor();
    for r in &mut records {
        r.scale_gross_revenue(factor);
    }
    records
}
