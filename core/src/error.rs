use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Invalid record count: {count} (must be >= 0)")]
    InvalidRecordCount { count: i64 },

    #[error("Invalid generation window: {reason}")]
    InvalidWindow { reason: String },

    #[error("Invalid weights for dimension '{dimension}'")]
    InvalidWeights { dimension: &'static str },

    #[error("Invalid range for '{field}': [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Control '{control}' out of range: {value}")]
    InvalidControl { control: &'static str, value: f64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
