//! Aggregation-request synthesis and time-bucket resolution.
//!
//! This module turns the run's shared preconditions (bin set, metric,
//! resolution, time window) into typed, per-collection aggregation
//! requests. It performs no I/O; executing a request is the store's job.

pub mod request;
pub mod resolution;

// Re-export main types
pub use request::{
    build_request, AggregateExpr, AggregationRequest, BinPredicate, MetricKind, PeakField,
    TimeWindow,
};
pub use resolution::{FieldRule, TimeResolutionSpec};
