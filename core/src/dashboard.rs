//! The dashboard facade: config, dataset cache and view assembly.
//!
//! PIPELINE (fixed, one direction):
//!   1. Generate (memoized by GenerationParams)
//!   2. Filter the canonical dataset into an owned copy
//!   3. Apply the price shift to the copy
//!   4. Compute analytics views over the shifted copy
//!
//! RULES:
//!   - The canonical dataset is shared read-only and never mutated.
//!   - Z-scores come from generation time; steps 2 and 3 never touch them.
//!   - Every degenerate view is a well-typed empty value or `None`.

use crate::{
    analytics::{self, BenfordReport, DigitSource, ExecutiveKpis, SupplyPoint},
    cache::DatasetCache,
    classifier::Chipset,
    config::{DashboardConfig, GenerationParams, ScenarioLimits},
    dataset::Dataset,
    derivation::PopulationStats,
    error::{DashError, DashResult},
    filter::{self, FilterCriteria, FilterOptions, PriceShift},
    record::{GroupDim, NumericField, TransactionRecord},
    types::Seed,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Slider positions, validated against `ScenarioLimits`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Controls {
    price_shift: PriceShift,
    risk_tolerance: f64,
}

impl Controls {
    pub fn new(limits: &ScenarioLimits, price_shift_pct: f64, risk_tolerance: f64) -> DashResult<Self> {
        if !(limits.price_shift_min_pct..=limits.price_shift_max_pct).contains(&price_shift_pct) {
            return Err(DashError::InvalidControl { control: "price_shift", value: price_shift_pct });
        }
        if !(limits.risk_tolerance_min..=limits.risk_tolerance_max).contains(&risk_tolerance) {
            return Err(DashError::InvalidControl { control: "risk_tolerance", value: risk_tolerance });
        }
        Ok(Self {
            price_shift: PriceShift::percent(price_shift_pct)?,
            risk_tolerance,
        })
    }

    pub fn defaults(limits: &ScenarioLimits) -> Self {
        Self {
            price_shift: PriceShift::none(),
            risk_tolerance: limits.default_risk_tolerance,
        }
    }

    pub fn price_shift(&self) -> PriceShift { self.price_shift }
    pub fn risk_tolerance(&self) -> f64 { self.risk_tolerance }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub dataset_id: Uuid,
    pub params: GenerationParams,
    pub population: PopulationStats,
    pub controls: Controls,
    pub kpis: ExecutiveKpis,
    pub revenue_by_theater: BTreeMap<String, f64>,
    pub revenue_by_chipset: BTreeMap<String, f64>,
    pub benford: BenfordReport,
    pub audit_trail: Vec<TransactionRecord>,
    pub supply_chain: Vec<SupplyPoint>,
    pub options: FilterOptions,
}

pub struct Dashboard {
    config: DashboardConfig,
    cache: DatasetCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> DashResult<Self> {
        config.validate()?;
        let profile = config.generation.profile()?;
        let cache = DatasetCache::new(profile, config.catalog.clone());
        Ok(Self { config, cache })
    }

    /// Dashboard over the hard-coded test config.
    pub fn build_test() -> DashResult<Self> {
        Self::new(DashboardConfig::default_test())
    }

    pub fn config(&self) -> &DashboardConfig { &self.config }
    pub fn cache(&self) -> &DatasetCache { &self.cache }

    pub fn default_params(&self) -> DashResult<GenerationParams> {
        self.config.generation.params()
    }

    pub fn default_controls(&self) -> Controls {
        Controls::defaults(&self.config.limits)
    }

    pub fn controls(&self, price_shift_pct: f64, risk_tolerance: f64) -> DashResult<Controls> {
        Controls::new(&self.config.limits, price_shift_pct, risk_tolerance)
    }

    /// Validate raw parameters, then return the memoized dataset.
    /// Nothing is generated when validation fails.
    pub fn generate(
        &mut self,
        seed: Seed,
        record_count: i64,
        start: NaiveDateTime,
        window_seconds: i64,
    ) -> DashResult<Arc<Dataset>> {
        let params = GenerationParams::new(seed, record_count, start, window_seconds)?;
        Ok(self.dataset(&params))
    }

    pub fn dataset(&mut self, params: &GenerationParams) -> Arc<Dataset> {
        self.cache.get_or_generate(params)
    }

    /// Filter, shift and analyse one frame.
    pub fn render(
        &mut self,
        params: &GenerationParams,
        criteria: &FilterCriteria,
        controls: &Controls,
    ) -> DashResult<DashboardView> {
        let dataset = self.dataset(params);
        let selected = filter::filter(&dataset, criteria).with_price_shift(controls.price_shift);

        let chip_universe: Vec<&str> = Chipset::ALL.iter().map(|c| c.label()).collect();
        let view = DashboardView {
            dataset_id: dataset.id(),
            params: *dataset.params(),
            population: *dataset.population(),
            controls: *controls,
            kpis: analytics::executive_kpis(&selected, controls.price_shift, controls.risk_tolerance),
            revenue_by_theater: analytics::group_sum(
                &selected,
                GroupDim::Theater,
                NumericField::GrossRevenue,
            ),
            revenue_by_chipset: analytics::group_sum_over(
                &selected,
                GroupDim::Chipset,
                NumericField::GrossRevenue,
                &chip_universe,
            ),
            benford: analytics::benford_report(&selected, DigitSource::LeadDigit),
            audit_trail: analytics::outliers(
                &selected,
                NumericField::RevenueZScore,
                controls.risk_tolerance,
            ),
            supply_chain: analytics::supply_chain(&selected),
            options: filter::filter_options(&dataset, criteria),
        };
        log::debug!(
            "rendered view: {} selected, {} alerts, shift={}%",
            view.kpis.record_count,
            view.kpis.critical_alerts,
            controls.price_shift.as_percent()
        );
        Ok(view)
    }
}
