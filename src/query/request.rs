//! Typed aggregation-request synthesis.
//!
//! Bins never reach a query executor as interpolated text: each bin becomes
//! a structured predicate paired with its column label, and the executor
//! evaluates the predicates directly. One request covers one collection,
//! grouped by resolution-truncated timestamp, sorted ascending.

use crate::binning::BinSet;
use crate::query::resolution::TimeResolutionSpec;
use crate::store::CollectionId;
use crate::utils::config::{MAX_STORE_TIME, MIN_STORE_TIME, TIME_FORMAT};
use chrono::NaiveDateTime;
use log::debug;
use std::str::FromStr;

/// The aggregate applied per bin per time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Count of records whose size falls in the bin's range
    SizeCount,

    /// Count of peaks at the bin's location
    PeakCount,

    /// Sum of peak heights at the bin's location
    HeightSum,

    /// Sum of peak areas at the bin's location
    AreaSum,

    /// Sum of relative peak areas at the bin's location
    RelativeAreaSum,
}

/// Numeric per-peak field a sum metric aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakField {
    Height,
    Area,
    RelArea,
}

impl MetricKind {
    /// One-letter code used in output filenames
    pub fn code(&self) -> char {
        match self {
            MetricKind::SizeCount => 'S',
            MetricKind::PeakCount => 'C',
            MetricKind::HeightSum => 'H',
            MetricKind::AreaSum => 'A',
            MetricKind::RelativeAreaSum => 'R',
        }
    }

    /// Whether this metric bins the continuous size attribute
    pub fn is_size_metric(&self) -> bool {
        matches!(self, MetricKind::SizeCount)
    }

    /// The peak field summed by this metric, if it is a sum metric
    pub fn peak_field(&self) -> Option<PeakField> {
        match self {
            MetricKind::HeightSum => Some(PeakField::Height),
            MetricKind::AreaSum => Some(PeakField::Area),
            MetricKind::RelativeAreaSum => Some(PeakField::RelArea),
            MetricKind::SizeCount | MetricKind::PeakCount => None,
        }
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "size-count" | "s" => Ok(MetricKind::SizeCount),
            "peak-count" | "c" => Ok(MetricKind::PeakCount),
            "height-sum" | "h" => Ok(MetricKind::HeightSum),
            "area-sum" | "a" => Ok(MetricKind::AreaSum),
            "rel-area-sum" | "relative-area-sum" | "r" => Ok(MetricKind::RelativeAreaSum),
            other => Err(format!(
                "unknown metric '{other}' (expected size-count, peak-count, height-sum, \
                 area-sum, or rel-area-sum)"
            )),
        }
    }
}

/// Typed per-bin predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinPredicate {
    /// Discrete attribute equals the value exactly
    Equals(i64),

    /// Continuous attribute within `[lower, upper]`, inclusive of both
    /// ends. A record sitting exactly on a shared edge matches both
    /// neighboring bins, so totals across bins double-count boundary
    /// values; published histograms have always counted edges this way,
    /// so do not tighten this to a half-open interval.
    Between { lower: f64, upper: f64 },
}

impl BinPredicate {
    /// Does a continuous size value satisfy this predicate?
    pub fn matches_size(&self, size: f64) -> bool {
        match self {
            BinPredicate::Between { lower, upper } => *lower <= size && size <= *upper,
            BinPredicate::Equals(_) => false,
        }
    }

    /// Does a discrete peak location satisfy this predicate?
    pub fn matches_peak(&self, location: i64) -> bool {
        match self {
            BinPredicate::Equals(value) => *value == location,
            BinPredicate::Between { .. } => false,
        }
    }
}

/// One bin's output column: label plus match predicate
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub label: String,
    pub predicate: BinPredicate,
}

/// Inclusive time window filtering events before aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// The widest window the source store accepts
    pub fn unbounded() -> Self {
        let start = NaiveDateTime::parse_from_str(MIN_STORE_TIME, TIME_FORMAT)
            .expect("sentinel minimum store time is valid");
        let end = NaiveDateTime::parse_from_str(MAX_STORE_TIME, TIME_FORMAT)
            .expect("sentinel maximum store time is valid");
        Self { start, end }
    }

    /// Inclusive containment at both ends
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// A grouped aggregation over one collection
///
/// Group-by key is the resolution-truncated event timestamp; the executor
/// returns one row per bucket actually present, ascending.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub collection: CollectionId,
    pub metric: MetricKind,
    pub window: TimeWindow,
    pub resolution: TimeResolutionSpec,
    pub aggregates: Vec<AggregateExpr>,
}

/// Combine a bin set and a metric into an aggregation request
///
/// Continuous bins become inclusive `Between` predicates over adjacent edge
/// pairs; discrete bins become `Equals` predicates. Labels follow bin
/// order, so the request's aggregate columns line up with
/// `BinSet::labels()`.
pub fn build_request(
    collection: CollectionId,
    metric: MetricKind,
    bins: &BinSet,
    resolution: TimeResolutionSpec,
    window: TimeWindow,
) -> AggregationRequest {
    let labels = bins.labels();

    let predicates: Vec<BinPredicate> = match bins {
        BinSet::Continuous(edges) => edges
            .windows(2)
            .map(|pair| BinPredicate::Between {
                lower: pair[0],
                upper: pair[1],
            })
            .collect(),
        BinSet::Discrete(values) => values.iter().map(|v| BinPredicate::Equals(*v)).collect(),
    };

    let aggregates = labels
        .into_iter()
        .zip(predicates)
        .map(|(label, predicate)| AggregateExpr { label, predicate })
        .collect::<Vec<_>>();

    debug!(
        "Synthesized request: collection {:?}, metric {:?}, {} aggregate columns",
        collection,
        metric,
        aggregates.len()
    );

    AggregationRequest {
        collection,
        metric,
        window,
        resolution,
        aggregates,
    }
}
