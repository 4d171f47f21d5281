use crate::{
    catalog::Catalog,
    dimensions::{SalesChannel, Theater, Weighted},
    error::{DashError, DashResult},
    types::Seed,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Largest window `chrono::Duration::seconds` accepts without panicking.
const MAX_WINDOW_SECONDS: i64 = i64::MAX / 1_000;

/// Inclusive integer sampling range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

/// Half-open real sampling range `[min, max)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
}

/// Generation settings as written in `generation.json`.
/// Unvalidated: call `params()` and `profile()` before generating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: Seed,
    pub record_count: i64,
    pub start: NaiveDateTime,
    pub window_seconds: i64,
    pub id_prefix: String,
    pub theaters: Vec<Weighted<Theater>>,
    pub channels: Vec<Weighted<SalesChannel>>,
    pub team_count: u16,
    pub units: IntRange,
    pub inventory: IntRange,
    pub rating: FloatRange,
    /// Manufacturing cost as a fraction of base price.
    pub cost_ratio: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            record_count: 25_000,
            start: default_start(),
            window_seconds: 31_536_000, // 365 days
            id_prefix: "AAPL-X".into(),
            theaters: vec![
                Weighted::new(Theater::Americas, 0.35),
                Weighted::new(Theater::Europe, 0.25),
                Weighted::new(Theater::GreaterChina, 0.20),
                Weighted::new(Theater::Japan, 0.10),
                Weighted::new(Theater::RestOfAsiaPacific, 0.10),
            ],
            channels: vec![
                Weighted::new(SalesChannel::Online, 0.40),
                Weighted::new(SalesChannel::Retail, 0.35),
                Weighted::new(SalesChannel::Enterprise, 0.15),
                Weighted::new(SalesChannel::Carrier, 0.10),
            ],
            team_count: 20,
            units: IntRange { min: 1, max: 99 },
            inventory: IntRange { min: 500, max: 9_999 },
            rating: FloatRange { min: 3.5, max: 5.0 },
            cost_ratio: 0.4,
        }
    }
}

impl GenerationConfig {
    /// The memoization key for this configuration.
    pub fn params(&self) -> DashResult<GenerationParams> {
        GenerationParams::new(self.seed, self.record_count, self.start, self.window_seconds)
    }

    pub fn profile(&self) -> DashResult<SamplingProfile> {
        SamplingProfile::from_config(self)
    }
}

/// Validated parameters identifying one generated dataset.
///
/// Two equal values always produce the same dataset under the same
/// profile and catalog, so this is what the cache is keyed on.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct GenerationParams {
    seed: Seed,
    record_count: usize,
    start: NaiveDateTime,
    window_seconds: u64,
}

impl GenerationParams {
    pub fn new(
        seed: Seed,
        record_count: i64,
        start: NaiveDateTime,
        window_seconds: i64,
    ) -> DashResult<Self> {
        let record_count = usize::try_from(record_count)
            .map_err(|_| DashError::InvalidRecordCount { count: record_count })?;
        if window_seconds <= 0 {
            return Err(DashError::InvalidWindow {
                reason: format!("window must be positive, got {window_seconds}s"),
            });
        }
        if window_seconds > MAX_WINDOW_SECONDS
            || start.checked_add_signed(Duration::seconds(window_seconds)).is_none()
        {
            return Err(DashError::InvalidWindow {
                reason: format!("{start} + {window_seconds}s overflows the calendar"),
            });
        }
        Ok(Self {
            seed,
            record_count,
            start,
            window_seconds: window_seconds as u64,
        })
    }

    pub fn seed(&self) -> Seed { self.seed }
    pub fn record_count(&self) -> usize { self.record_count }
    pub fn start(&self) -> NaiveDateTime { self.start }
    pub fn window_seconds(&self) -> u64 { self.window_seconds }

    /// Exclusive end of the window.
    pub fn end(&self) -> NaiveDateTime {
        // Checked in new().
        self.start + Duration::seconds(self.window_seconds as i64)
    }

}

/// Validated sampling distributions for every non-key dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingProfile {
    pub id_prefix: String,
    pub theaters: Vec<Theater>,
    pub theater_weights: Vec<f64>,
    pub channels: Vec<SalesChannel>,
    pub channel_weights: Vec<f64>,
    pub team_count: u16,
    pub units: IntRange,
    pub inventory: IntRange,
    pub rating: FloatRange,
    pub cost_ratio: f64,
}

impl SamplingProfile {
    pub fn from_config(config: &GenerationConfig) -> DashResult<Self> {
        let (theaters, theater_weights) = split_weighted(&config.theaters, "theater")?;
        let (channels, channel_weights) = split_weighted(&config.channels, "channel")?;
        if config.team_count == 0 {
            return Err(DashError::InvalidWeights { dimension: "team" });
        }
        check_int_range("units", config.units)?;
        check_int_range("inventory", config.inventory)?;
        let rating = config.rating;
        if !(rating.min.is_finite() && rating.max.is_finite()) || rating.min > rating.max {
            return Err(DashError::InvalidRange { field: "rating", min: rating.min, max: rating.max });
        }
        if !(0.0..1.0).contains(&config.cost_ratio) {
            return Err(DashError::InvalidRange {
                field: "cost_ratio",
                min: config.cost_ratio,
                max: config.cost_ratio,
            });
        }
        Ok(Self {
            id_prefix: config.id_prefix.clone(),
            theaters,
            theater_weights,
            channels,
            channel_weights,
            team_count: config.team_count,
            units: config.units,
            inventory: config.inventory,
            rating,
            cost_ratio: config.cost_ratio,
        })
    }
}

fn split_weighted<T: Copy>(
    entries: &[Weighted<T>],
    dimension: &'static str,
) -> DashResult<(Vec<T>, Vec<f64>)> {
    let bad_weight = entries.iter().any(|e| !e.weight.is_finite() || e.weight < 0.0);
    let total: f64 = entries.iter().map(|e| e.weight).sum();
    if entries.is_empty() || bad_weight || total <= 0.0 {
        return Err(DashError::InvalidWeights { dimension });
    }
    Ok(entries.iter().map(|e| (e.value, e.weight)).unzip())
}

fn check_int_range(field: &'static str, range: IntRange) -> DashResult<()> {
    if range.min == 0 || range.min > range.max {
        return Err(DashError::InvalidRange {
            field,
            min: range.min as f64,
            max: range.max as f64,
        });
    }
    Ok(())
}

fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Slider bounds for the interactive controls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioLimits {
    pub price_shift_min_pct: f64,
    pub price_shift_max_pct: f64,
    pub risk_tolerance_min: f64,
    pub risk_tolerance_max: f64,
    pub default_risk_tolerance: f64,
}

impl Default for ScenarioLimits {
    fn default() -> Self {
        Self {
            price_shift_min_pct: -25.0,
            price_shift_max_pct: 25.0,
            risk_tolerance_min: 1.5,
            risk_tolerance_max: 5.0,
            default_risk_tolerance: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GenerationFile {
    generation: GenerationConfig,
    #[serde(default)]
    limits: ScenarioLimits,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub generation: GenerationConfig,
    pub catalog: Catalog,
    pub limits: ScenarioLimits,
}

impl DashboardConfig {
    /// Load from the data/ directory.
    /// In tests, use DashboardConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let gen_path = format!("{data_dir}/generation.json");
        let gen_content = std::fs::read_to_string(&gen_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {gen_path}: {e}"))?;
        let gen_file: GenerationFile = serde_json::from_str(&gen_content)?;

        let catalog_path = format!("{data_dir}/catalog.json");
        let catalog_content = std::fs::read_to_string(&catalog_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {catalog_path}: {e}"))?;
        let catalog = Catalog::from_json(&catalog_content)
            .map_err(|e| anyhow::anyhow!("Invalid {catalog_path}: {e}"))?;

        let config = Self {
            generation: gen_file.generation,
            catalog,
            limits: gen_file.limits,
        };
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Matches the shipped data/ files.
    pub fn default_test() -> Self {
        Self {
            generation: GenerationConfig::default(),
            catalog: Catalog::builtin(),
            limits: ScenarioLimits::default(),
        }
    }

    /// Fail fast on anything generation would reject.
    pub fn validate(&self) -> DashResult<()> {
        self.generation.params()?;
        self.generation.profile()?;
        let l = &self.limits;
        if l.price_shift_min_pct > l.price_shift_max_pct || l.price_shift_min_pct <= -100.0 {
            return Err(DashError::InvalidRange {
                field: "price_shift",
                min: l.price_shift_min_pct,
                max: l.price_shift_max_pct,
            });
        }
        if l.risk_tolerance_min > l.risk_tolerance_max
            || !(l.risk_tolerance_min..=l.risk_tolerance_max).contains(&l.default_risk_tolerance)
        {
            return Err(DashError::InvalidRange {
                field: "risk_tolerance",
                min: l.risk_tolerance_min,
                max: l.risk_tolerance_max,
            });
        }
        Ok(())
    }
}
