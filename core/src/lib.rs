//! Synthetic sales dataset generation, filtering and analytics for the
//! executive revenue dashboard.
//!
//! Data flows one way: catalog → generator → derivation → cached
//! dataset → filter → analytics views. See `dashboard` for the wiring.

pub mod analytics;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod derivation;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod generator;
pub mod record;
pub mod rng;
pub mod types;

pub use dataset::{generate, Dataset};
pub use error::{DashError, DashResult};
pub use filter::filter;
