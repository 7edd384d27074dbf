//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while resolving a bin specification
///
/// Bin definitions are shared across every collection in a run, so any of
/// these aborts the whole run.
#[derive(Error, Debug)]
pub enum BinSpecError {
    #[error("bin edges must be strictly increasing: {next} follows {prev}")]
    NotAscending { prev: f64, next: f64 },

    #[error("cannot parse bin value: {0}")]
    Unparsable(String),

    #[error("inverted peak range: {lower} > {upper}")]
    InvertedRange { lower: i64, upper: i64 },

    #[error("bin specification is empty")]
    Empty,

    #[error("no published table for {0} bins per decade")]
    UnknownPreset(u32),
}

/// Errors that can occur while resolving collections or executing
/// an aggregation request
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("failed to read event file: {0}")]
    StoreUnavailable(#[from] std::io::Error),

    #[error("invalid event file: {0}")]
    InvalidEventFile(#[from] serde_json::Error),
}

/// Errors that can occur while regularizing a time series
#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("aggregation returned no rows")]
    EmptyResultSet,

    #[error(
        "irregular gap after row {index}: delta of {delta}s is not a positive multiple of {resolution}s"
    )]
    IrregularResolutionGap {
        index: usize,
        delta: i64,
        resolution: i64,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
