//! Event store and query-execution boundary.
//!
//! An `AggregationRequest` is structured data; executors evaluate the typed
//! predicates directly, so no bin value is ever spliced into query text.

pub mod memory;

// Re-export the shipped executor
pub use memory::{MemoryStore, ParticleEvent, Peak};

use crate::query::request::AggregationRequest;
use crate::series::TimeSeries;
use crate::utils::error::QueryError;

/// Identifier a collection name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionId(pub u32);

/// Executes aggregation requests against a backing store
pub trait QueryExecutor {
    /// Resolve a collection name to its identifier
    ///
    /// # Errors
    /// * `QueryError::UnknownCollection` - no collection has that name
    fn resolve_collection(&self, name: &str) -> Result<CollectionId, QueryError>;

    /// Run one grouped aggregation
    ///
    /// Returns one row per time bucket that actually contains events,
    /// ascending by bucket timestamp, with the aggregate vector in the
    /// request's bin order. Buckets with no events are absent; the
    /// regularizer fills them afterwards.
    fn run(&self, request: &AggregationRequest) -> Result<TimeSeries, QueryError>;
}
