//! Analytics views over a (filtered) record slice.
//!
//! Every function here is pure and order-insensitive in its input.
//! Degenerate inputs (no records, zero denominators) produce an empty
//! map or `None`, never a panic, so the renderer can show "no data".

use crate::{
    derivation::leading_digit,
    dimensions::Theater,
    filter::PriceShift,
    record::{GroupDim, NumericField, TransactionRecord},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const BENFORD_DIGITS: std::ops::RangeInclusive<u8> = 1..=9;

// ── Grouped sums ─────────────────────────────────────────────────────────────

/// Sum `field` per value of `dim`. Every group present in the input
/// appears in the output.
pub fn group_sum(
    records: &[TransactionRecord],
    dim: GroupDim,
    field: NumericField,
) -> BTreeMap<String, f64> {
    let mut sums = BTreeMap::new();
    for r in records {
        *sums.entry(dim.key(r)).or_insert(0.0) += field.value(r);
    }
    sums
}

/// Like `group_sum`, but every value of `universe` is present, with 0.0
/// when no record falls in it. Groups outside the universe are kept too.
pub fn group_sum_over<S: AsRef<str>>(
    records: &[TransactionRecord],
    dim: GroupDim,
    field: NumericField,
    universe: &[S],
) -> BTreeMap<String, f64> {
    let mut sums = group_sum(records, dim, field);
    for key in universe {
        sums.entry(key.as_ref().to_string()).or_insert(0.0);
    }
    sums
}

pub fn field_sum(records: &[TransactionRecord], field: NumericField) -> f64 {
    records.iter().map(|r| field.value(r)).sum()
}

pub fn field_mean(records: &[TransactionRecord], field: NumericField) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    Some(field_sum(records, field) / records.len() as f64)
}

// ── Benford ──────────────────────────────────────────────────────────────────

/// Where the leading digit comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DigitSource {
    /// The digit stored at generation time (pre price shift).
    LeadDigit,
    /// The leading digit of a field's current value.
    Field(NumericField),
}

impl DigitSource {
    fn digit(&self, record: &TransactionRecord) -> u8 {
        match self {
            Self::LeadDigit => record.lead_digit(),
            Self::Field(field) => leading_digit(field.value(record)),
        }
    }
}

/// Relative frequency of leading digits 1..=9.
///
/// Digit 0 (non-positive values) is excluded before normalizing, so the
/// result sums to 1.0. All nine digits are keyed when anything remains;
/// an input with nothing left after exclusion gives an empty map.
pub fn digit_distribution(records: &[TransactionRecord], source: DigitSource) -> BTreeMap<u8, f64> {
    let mut counts = [0u64; 10];
    for r in records {
        counts[source.digit(r) as usize] += 1;
    }
    let total: u64 = counts[1..].iter().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    BENFORD_DIGITS
        .map(|d| (d, counts[d as usize] as f64 / total as f64))
        .collect()
}

/// log10(1 + 1/d) for d in 1..=9.
pub fn benford_expected() -> BTreeMap<u8, f64> {
    BENFORD_DIGITS
        .map(|d| (d, (1.0 + 1.0 / d as f64).log10()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenfordReport {
    pub sample_size: usize,
    pub observed: BTreeMap<u8, f64>,
    pub expected: BTreeMap<u8, f64>,
    /// Mean of |observed - expected| over the nine digits.
    pub mean_absolute_deviation: Option<f64>,
}

pub fn benford_report(records: &[TransactionRecord], source: DigitSource) -> BenfordReport {
    let observed = digit_distribution(records, source);
    let expected = benford_expected();
    let sample_size = records.iter().filter(|r| source.digit(r) != 0).count();
    let mean_absolute_deviation = if observed.is_empty() {
        None
    } else {
        let total: f64 = expected
            .iter()
            .map(|(d, e)| (observed.get(d).copied().unwrap_or(0.0) - e).abs())
            .sum();
        Some(total / expected.len() as f64)
    };
    BenfordReport { sample_size, observed, expected, mean_absolute_deviation }
}

// ── Outliers ─────────────────────────────────────────────────────────────────

/// Records with |score| strictly above `threshold`, ordered by gross
/// revenue descending, ties by transaction id ascending.
pub fn outliers(
    records: &[TransactionRecord],
    score: NumericField,
    threshold: f64,
) -> Vec<TransactionRecord> {
    outliers_by(records, score, threshold, NumericField::GrossRevenue)
}

/// As `outliers`, ordered by an arbitrary audit field.
pub fn outliers_by(
    records: &[TransactionRecord],
    score: NumericField,
    threshold: f64,
    order_by: NumericField,
) -> Vec<TransactionRecord> {
    let mut out: Vec<TransactionRecord> = records
        .iter()
        .filter(|r| score.value(r).abs() > threshold)
        .cloned()
        .collect();
    out.sort_by(|a, b| audit_order(a, b, order_by));
    out
}

fn audit_order(a: &TransactionRecord, b: &TransactionRecord, field: NumericField) -> Ordering {
    field
        .value(b)
        .total_cmp(&field.value(a))
        .then_with(|| a.id().cmp(b.id()))
}

// ── Supply chain ─────────────────────────────────────────────────────────────

/// One point of the inventory vs units-sold scatter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SupplyPoint {
    pub transaction_id: String,
    pub theater: Theater,
    pub inventory_on_hand: u32,
    pub units_sold: u32,
    pub revenue_z_score: f64,
}

/// One point per record, in input order.
pub fn supply_chain(records: &[TransactionRecord]) -> Vec<SupplyPoint> {
    records
        .iter()
        .map(|r| {
            let s = r.sale();
            SupplyPoint {
                transaction_id: s.transaction_id.clone(),
                theater: s.theater,
                inventory_on_hand: s.inventory_on_hand,
                units_sold: s.units_sold,
                revenue_z_score: r.revenue_z_score(),
            }
        })
        .collect()
}

// ── Ratios and KPIs ──────────────────────────────────────────────────────────

/// `numerator_sum / denominator_mean`, or `None` when the denominator
/// is zero or either side is not finite.
pub fn ratio_metric(numerator_sum: f64, denominator_mean: f64) -> Option<f64> {
    if denominator_mean == 0.0 || !denominator_mean.is_finite() || !numerator_sum.is_finite() {
        return None;
    }
    Some(numerator_sum / denominator_mean)
}

/// Total units sold over mean inventory on hand.
pub fn inventory_velocity(records: &[TransactionRecord]) -> Option<f64> {
    let mean_inventory = field_mean(records, NumericField::InventoryOnHand)?;
    ratio_metric(field_sum(records, NumericField::UnitsSold), mean_inventory)
}

/// Net profit as a percentage of gross revenue.
pub fn operating_margin_pct(records: &[TransactionRecord]) -> Option<f64> {
    let revenue = field_sum(records, NumericField::GrossRevenue);
    if revenue == 0.0 {
        return None;
    }
    Some(field_sum(records, NumericField::NetProfit) / revenue * 100.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutiveKpis {
    pub record_count: usize,
    pub revenue_forecast: f64,
    pub price_shift_pct: f64,
    pub operating_margin_pct: Option<f64>,
    pub critical_alerts: usize,
    pub inventory_velocity: Option<f64>,
}

/// Headline metrics over records that already carry the price shift.
pub fn executive_kpis(
    records: &[TransactionRecord],
    shift: PriceShift,
    risk_tolerance: f64,
) -> ExecutiveKpis {
    ExecutiveKpis {
        record_count: records.len(),
        revenue_forecast: field_sum(records, NumericField::GrossRevenue),
        price_shift_pct: shift.as_percent(),
        operating_margin_pct: operating_margin_pct(records),
        critical_alerts: records
            .iter()
            .filter(|r| r.revenue_z_score().abs() > risk_tolerance)
            .count(),
        inventory_velocity: inventory_velocity(records),
    }
}
