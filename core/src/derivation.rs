//! Derived-field computation.
//!
//! Runs once over the full generated population. Z-scores use the
//! population mean and population standard deviation of gross revenue
//! at generation time and are never recomputed: filtered subsets and
//! price-shifted copies keep the original scores.

use crate::{
    classifier::classify_chipset,
    record::{DerivedFields, Sale, TransactionRecord},
};
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation (ddof = 0) of a column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PopulationStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl PopulationStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { count: 0, mean: 0.0, std_dev: 0.0 };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self { count: values.len(), mean, std_dev: variance.sqrt() }
    }

    /// Standard score of `value`. A zero-spread population scores 0.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

pub fn gross_revenue(units_sold: u32, base_price: f64) -> f64 {
    units_sold as f64 * base_price
}

pub fn net_profit(gross_revenue: f64, units_sold: u32, manufacturing_cost: f64) -> f64 {
    gross_revenue - units_sold as f64 * manufacturing_cost
}

/// First decimal digit of the truncated value; 0 when value <= 0.
///
/// 0 is a sentinel, not a Benford digit. Values in (0, 1) also
/// truncate to 0.
pub fn leading_digit(value: f64) -> u8 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let mut n = value.trunc() as u64;
    while n >= 10 {
        n /= 10;
    }
    n as u8
}

/// Enrich every sale with its derived fields.
/// Returns the records in input order plus the population stats the
/// z-scores were computed against.
pub fn derive_records(sales: Vec<Sale>) -> (Vec<TransactionRecord>, PopulationStats) {
    let revenues: Vec<f64> = sales
        .iter()
        .map(|s| gross_revenue(s.units_sold, s.base_price))
        .collect();
    let stats = PopulationStats::from_values(&revenues);

    let records = sales
        .into_iter()
        .zip(revenues)
        .map(|(sale, revenue)| {
            let derived = DerivedFields::new(
                revenue,
                net_profit(revenue, sale.units_sold, sale.manufacturing_cost),
                leading_digit(revenue),
                classify_chipset(&sale.model),
                stats.z_score(revenue),
            );
            TransactionRecord::new(sale, derived)
        })
        .collect();

    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_digit_edges() {
        assert_eq!(leading_digit(1000.0), 1);
        assert_eq!(leading_digit(9.99), 9);
        assert_eq!(leading_digit(47_961.0), 4);
        assert_eq!(leading_digit(0.0), 0);
        assert_eq!(leading_digit(-250.0), 0);
        assert_eq!(leading_digit(0.75), 0);
        assert_eq!(leading_digit(f64::NAN), 0);
    }

    #[test]
    fn population_std_uses_ddof_zero() {
        let stats = PopulationStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std_dev, 2.0);
        assert_eq!(stats.z_score(9.0), 2.0);
    }

    #[test]
    fn zero_spread_scores_zero() {
        let stats = PopulationStats::from_values(&[3.0, 3.0]);
        assert_eq!(stats.z_score(3.0), 0.0);
        assert_eq!(PopulationStats::from_values(&[]).count, 0);
    }
}
