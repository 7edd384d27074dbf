//! In-memory query executor backed by a JSON event file.
//!
//! The file holds every collection's events up front; aggregation walks the
//! in-window events (or event x peak pairs for the peak metrics), snaps
//! each to its time bucket, and applies the request's predicates per bin.

use super::{CollectionId, QueryExecutor};
use crate::query::request::{AggregationRequest, MetricKind, PeakField};
use crate::series::{ResultRow, TimeSeries};
use crate::utils::error::QueryError;
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A single peak within an event's mass spectrum
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Peak {
    /// Integer mass/charge location
    pub location: i64,
    pub height: f64,
    pub area: f64,
    pub rel_area: f64,
}

/// One particle measurement event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParticleEvent {
    /// Acquisition wall-clock time, second precision
    pub time: NaiveDateTime,

    /// Continuous particle size
    pub size: f64,

    /// Sparse spectrum; events without peaks contribute to size metrics only
    #[serde(default)]
    pub peaks: Vec<Peak>,
}

#[derive(Debug, Clone, Deserialize)]
struct CollectionRecord {
    name: String,
    events: Vec<ParticleEvent>,
}

#[derive(Debug, Deserialize)]
struct EventFile {
    collections: Vec<CollectionRecord>,
}

/// In-memory store with every collection fully loaded
pub struct MemoryStore {
    collections: Vec<CollectionRecord>,
}

impl MemoryStore {
    /// Load a JSON event file
    ///
    /// # Errors
    /// * `QueryError::StoreUnavailable` - the file cannot be opened
    /// * `QueryError::InvalidEventFile` - the JSON does not parse
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let path = path.as_ref();
        debug!("Loading event file: {}", path.display());

        let file = File::open(path)?;
        let parsed: EventFile = serde_json::from_reader(BufReader::new(file))?;

        info!(
            "Loaded {} collections ({} events) from {}",
            parsed.collections.len(),
            parsed.collections.iter().map(|c| c.events.len()).sum::<usize>(),
            path.display()
        );

        Ok(Self {
            collections: parsed.collections,
        })
    }

    /// Build a store directly from named event lists (tests, embedding)
    pub fn from_collections(collections: Vec<(String, Vec<ParticleEvent>)>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|(name, events)| CollectionRecord { name, events })
                .collect(),
        }
    }

    fn record(&self, id: CollectionId) -> Result<&CollectionRecord, QueryError> {
        self.collections
            .get(id.0 as usize)
            .ok_or_else(|| QueryError::UnknownCollection(format!("#{}", id.0)))
    }
}

impl QueryExecutor for MemoryStore {
    fn resolve_collection(&self, name: &str) -> Result<CollectionId, QueryError> {
        self.collections
            .iter()
            .position(|c| c.name == name)
            .map(|i| CollectionId(i as u32))
            .ok_or_else(|| QueryError::UnknownCollection(name.to_string()))
    }

    fn run(&self, request: &AggregationRequest) -> Result<TimeSeries, QueryError> {
        let record = self.record(request.collection)?;
        let arity = request.aggregates.len();

        // BTreeMap keeps buckets in ascending timestamp order
        let mut buckets: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();

        for event in &record.events {
            if !request.window.contains(event.time) {
                continue;
            }
            let bucket_ts = request.resolution.truncate(event.time);

            if request.metric == MetricKind::SizeCount {
                // Any in-window event opens its bucket, matching or not
                let row = buckets.entry(bucket_ts).or_insert_with(|| vec![0.0; arity]);
                for (slot, aggregate) in row.iter_mut().zip(&request.aggregates) {
                    if aggregate.predicate.matches_size(event.size) {
                        *slot += 1.0;
                    }
                }
            } else {
                // Peak metrics join event x peak; an event with no peaks
                // contributes no bucket at all
                for peak in &event.peaks {
                    let contribution = match request.metric.peak_field() {
                        None => 1.0,
                        Some(PeakField::Height) => peak.height,
                        Some(PeakField::Area) => peak.area,
                        Some(PeakField::RelArea) => peak.rel_area,
                    };
                    let row = buckets.entry(bucket_ts).or_insert_with(|| vec![0.0; arity]);
                    for (slot, aggregate) in row.iter_mut().zip(&request.aggregates) {
                        if aggregate.predicate.matches_peak(peak.location) {
                            *slot += contribution;
                        }
                    }
                }
            }
        }

        debug!(
            "Aggregated collection '{}': {} events into {} buckets",
            record.name,
            record.events.len(),
            buckets.len()
        );

        Ok(buckets
            .into_iter()
            .map(|(timestamp, values)| ResultRow::new(timestamp, values))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinSet;
    use crate::query::request::{build_request, TimeWindow};
    use crate::query::resolution::TimeResolutionSpec;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn peak(location: i64, height: f64) -> Peak {
        Peak {
            location,
            height,
            area: height * 2.0,
            rel_area: height / 10.0,
        }
    }

    fn sized_event(time: &str, size: f64) -> ParticleEvent {
        ParticleEvent {
            time: ts(time),
            size,
            peaks: vec![],
        }
    }

    fn spectrum_event(time: &str, peaks: Vec<Peak>) -> ParticleEvent {
        ParticleEvent {
            time: ts(time),
            size: 0.5,
            peaks,
        }
    }

    fn store(events: Vec<ParticleEvent>) -> MemoryStore {
        MemoryStore::from_collections(vec![("ambient".to_string(), events)])
    }

    #[test]
    fn test_resolve_collection() {
        let s = store(vec![]);
        assert_eq!(s.resolve_collection("ambient").unwrap(), CollectionId(0));
        assert!(matches!(
            s.resolve_collection("missing"),
            Err(QueryError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_discrete_bin_exactness() {
        // Peaks at locations [5, 5, 7, 9] against bins {5, 7}: bin 5
        // counts 2, bin 7 counts 1, and 9 contributes nowhere
        let s = store(vec![spectrum_event(
            "2013-06-01 00:00:10",
            vec![peak(5, 1.0), peak(5, 2.0), peak(7, 3.0), peak(9, 4.0)],
        )]);
        let request = build_request(
            CollectionId(0),
            MetricKind::PeakCount,
            &BinSet::Discrete(vec![5, 7]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, ts("2013-06-01 00:00:00"));
        assert_eq!(rows[0].values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_height_sum() {
        let s = store(vec![spectrum_event(
            "2013-06-01 00:00:10",
            vec![peak(5, 1.5), peak(5, 2.5), peak(7, 3.0)],
        )]);
        let request = build_request(
            CollectionId(0),
            MetricKind::HeightSum,
            &BinSet::Discrete(vec![5, 7]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();
        assert_eq!(rows[0].values, vec![4.0, 3.0]);
    }

    #[test]
    fn test_size_count_buckets() {
        let s = store(vec![
            sized_event("2013-06-01 00:00:10", 0.2),
            sized_event("2013-06-01 00:00:40", 0.7),
            sized_event("2013-06-01 00:02:10", 0.2),
        ]);
        let request = build_request(
            CollectionId(0),
            MetricKind::SizeCount,
            &BinSet::Continuous(vec![0.0, 0.5, 1.0]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();

        // Only buckets containing events are present; the gap stays open
        // for the regularizer
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, ts("2013-06-01 00:00:00"));
        assert_eq!(rows[0].values, vec![1.0, 1.0]);
        assert_eq!(rows[1].timestamp, ts("2013-06-01 00:02:00"));
        assert_eq!(rows[1].values, vec![1.0, 0.0]);
    }

    #[test]
    fn test_boundary_size_counts_in_both_bins() {
        let s = store(vec![sized_event("2013-06-01 00:00:10", 0.5)]);
        let request = build_request(
            CollectionId(0),
            MetricKind::SizeCount,
            &BinSet::Continuous(vec![0.0, 0.5, 1.0]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();
        assert_eq!(rows[0].values, vec![1.0, 1.0]);
    }

    #[test]
    fn test_unmatched_event_still_opens_bucket() {
        // An oversize record still groups into its bucket, leaving an
        // all-zero row rather than no row
        let s = store(vec![sized_event("2013-06-01 00:00:10", 5.0)]);
        let request = build_request(
            CollectionId(0),
            MetricKind::SizeCount,
            &BinSet::Continuous(vec![0.0, 0.5, 1.0]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_window_filters_events() {
        let s = store(vec![
            sized_event("2013-06-01 00:00:10", 0.2),
            sized_event("2013-06-03 00:00:10", 0.2),
        ]);
        let window = TimeWindow::new(ts("2013-06-01 00:00:00"), ts("2013-06-01 23:59:59"));
        let request = build_request(
            CollectionId(0),
            MetricKind::SizeCount,
            &BinSet::Continuous(vec![0.0, 1.0]),
            TimeResolutionSpec::new(60),
            window,
        );

        let rows = s.run(&request).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, ts("2013-06-01 00:00:00"));
    }

    #[test]
    fn test_empty_collection_returns_no_rows() {
        let s = store(vec![]);
        let request = build_request(
            CollectionId(0),
            MetricKind::SizeCount,
            &BinSet::Continuous(vec![0.0, 1.0]),
            TimeResolutionSpec::new(60),
            TimeWindow::unbounded(),
        );

        let rows = s.run(&request).unwrap();
        assert!(rows.is_empty());
    }
}
