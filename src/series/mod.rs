//! Aggregated time-series rows and time-grid regularization.

pub mod regularize;

// Re-export the main entry point
pub use regularize::regularize;

use chrono::NaiveDateTime;

/// One aggregated time bucket: timestamp plus one value per bin, in bin
/// order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub timestamp: NaiveDateTime,
    pub values: Vec<f64>,
}

impl ResultRow {
    pub fn new(timestamp: NaiveDateTime, values: Vec<f64>) -> Self {
        Self { timestamp, values }
    }

    /// An all-zero row of the given arity, used to fill missing buckets
    pub fn zeros(timestamp: NaiveDateTime, arity: usize) -> Self {
        Self {
            timestamp,
            values: vec![0.0; arity],
        }
    }
}

/// Rows ascending by timestamp; duplicate-free before regularization,
/// exactly resolution-spaced after
pub type TimeSeries = Vec<ResultRow>;
