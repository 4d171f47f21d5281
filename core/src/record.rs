//! The transaction record schema.
//!
//! A record is the sampled `Sale` plus its `DerivedFields`. Records can
//! only be built by the derivation pass and expose getters only, so the
//! derived fields stay a pure function of the sale and the population.
//! Records serialize for output but never deserialize.

use crate::{
    classifier::Chipset,
    dimensions::{SalesChannel, Team, Theater},
    types::{CatalogName, RecordId},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Base fields, exactly as sampled by the generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub transaction_id: RecordId,
    pub timestamp: NaiveDateTime,
    pub theater: Theater,
    pub category: CatalogName,
    pub model: CatalogName,
    pub color: CatalogName,
    pub channel: SalesChannel,
    pub team: Team,
    pub units_sold: u32,
    pub base_price: f64,
    pub manufacturing_cost: f64,
    pub inventory_on_hand: u32,
    pub customer_rating: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedFields {
    gross_revenue: f64,
    net_profit: f64,
    lead_digit: u8,
    chipset: Chipset,
    revenue_z_score: f64,
}

impl DerivedFields {
    pub(crate) fn new(
        gross_revenue: f64,
        net_profit: f64,
        lead_digit: u8,
        chipset: Chipset,
        revenue_z_score: f64,
    ) -> Self {
        Self { gross_revenue, net_profit, lead_digit, chipset, revenue_z_score }
    }

    pub fn gross_revenue(&self) -> f64 { self.gross_revenue }
    pub fn net_profit(&self) -> f64 { self.net_profit }
    pub fn lead_digit(&self) -> u8 { self.lead_digit }
    pub fn chipset(&self) -> Chipset { self.chipset }
    pub fn revenue_z_score(&self) -> f64 { self.revenue_z_score }
}

/// A sale with its derived fields.
///
/// Base fields are read-only, even on filtered copies:
///
/// ```compile_fail
/// # use salesdash_core::{catalog::Catalog, config::GenerationConfig, dataset::generate};
/// # let cfg = GenerationConfig { record_count: 1, ..Default::default() };
/// # let ds = generate(&cfg.params().unwrap(), &cfg.profile().unwrap(), std::sync::Arc::new(Catalog::builtin()));
/// let mut copy = ds.records().to_vec();
/// copy[0].sale.units_sold = 1;
/// ```
///
/// and records cannot be forged from JSON:
///
/// ```compile_fail
/// # use salesdash_core::record::TransactionRecord;
/// let forged: TransactionRecord = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionRecord {
    #[serde(flatten)]
    sale: Sale,
    #[serde(flatten)]
    derived: DerivedFields,
}

impl TransactionRecord {
    pub(crate) fn new(sale: Sale, derived: DerivedFields) -> Self {
        Self { sale, derived }
    }

    pub fn sale(&self) -> &Sale { &self.sale }
    pub fn id(&self) -> &str { &self.sale.transaction_id }
    pub fn derived(&self) -> &DerivedFields { &self.derived }
    pub fn gross_revenue(&self) -> f64 { self.derived.gross_revenue }
    pub fn net_profit(&self) -> f64 { self.derived.net_profit }
    pub fn lead_digit(&self) -> u8 { self.derived.lead_digit }
    pub fn chipset(&self) -> Chipset { self.derived.chipset }
    pub fn revenue_z_score(&self) -> f64 { self.derived.revenue_z_score }

    /// Price-shift simulation only touches gross revenue of a copy.
    pub(crate) fn scale_gross_revenue(&mut self, factor: f64) {
        self.derived.gross_revenue *= factor;
    }
}

/// Numeric columns that analytics can sum, audit or rank by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    UnitsSold,
    BasePrice,
    ManufacturingCost,
    InventoryOnHand,
    CustomerRating,
    GrossRevenue,
    NetProfit,
    RevenueZScore,
}

impl NumericField {
    pub fn value(&self, record: &TransactionRecord) -> f64 {
        match self {
            Self::UnitsSold         => record.sale.units_sold as f64,
            Self::BasePrice         => record.sale.base_price,
            Self::ManufacturingCost => record.sale.manufacturing_cost,
            Self::InventoryOnHand   => record.sale.inventory_on_hand as f64,
            Self::CustomerRating    => record.sale.customer_rating,
            Self::GrossRevenue      => record.gross_revenue(),
            Self::NetProfit         => record.net_profit(),
            Self::RevenueZScore     => record.revenue_z_score(),
        }
    }
}

/// Categorical columns that analytics can group by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GroupDim {
    Theater,
    Category,
    Model,
    Color,
    Chipset,
    Channel,
    Team,
}

impl GroupDim {
    pub fn key(&self, record: &TransactionRecord) -> String {
        match self {
            Self::Theater  => record.sale.theater.to_string(),
            Self::Category => record.sale.category.clone(),
            Self::Model    => record.sale.model.clone(),
            Self::Color    => record.sale.color.clone(),
            Self::Chipset  => record.chipset().to_string(),
            Self::Channel  => record.sale.channel.to_string(),
            Self::Team     => record.sale.team.to_string(),
        }
    }
}
