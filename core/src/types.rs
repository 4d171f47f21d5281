//! Shared primitive types used across the entire pipeline.

/// A stable, unique identifier for a generated transaction.
pub type RecordId = String;

/// Master seed for one generated dataset.
pub type Seed = u64;

/// A category, model or color name as it appears in the catalog.
pub type CatalogName = String;
