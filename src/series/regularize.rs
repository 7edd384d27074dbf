//! Gap repair for aggregated time series.
//!
//! Executors only return buckets that actually contain events. This pass
//! re-inserts the missing buckets as all-zero rows so that every multiple
//! of the resolution between the first and last observation is present,
//! giving downstream consumers a uniform time axis.

use super::{ResultRow, TimeSeries};
use crate::utils::error::SeriesError;
use chrono::Duration;
use log::debug;

/// Fill every missing bucket with an all-zero row, in place
///
/// Single forward scan with in-place insertion: each iteration examines the
/// gap between row `i` and its successor and inserts at most one zero row,
/// so a gap spanning `k` buckets closes over `k` successive iterations.
/// The index advances unconditionally and the loop bound is re-read every
/// iteration; each step either passes a correctly spaced pair or shrinks
/// the remaining gap by one bucket, so the scan terminates.
///
/// # Arguments
/// * `series` - ascending, duplicate-free rows from the executor
/// * `resolution_secs` - bucket width the series was grouped by
///
/// # Errors
/// * `SeriesError::EmptyResultSet` - the input has no rows
/// * `SeriesError::IrregularResolutionGap` - an adjacent delta is zero,
///   negative, or not a whole multiple of the resolution
pub fn regularize(series: &mut TimeSeries, resolution_secs: u32) -> Result<(), SeriesError> {
    if series.is_empty() {
        return Err(SeriesError::EmptyResultSet);
    }

    let step = i64::from(resolution_secs);
    let before = series.len();
    let mut i = 0;

    // The bound is re-read every iteration: insertions extend the series,
    // and the scan must run until it reaches the (moving) final row
    while i + 1 < series.len() {
        let delta = (series[i + 1].timestamp - series[i].timestamp).num_seconds();

        if delta <= 0 || delta % step != 0 {
            return Err(SeriesError::IrregularResolutionGap {
                index: i,
                delta,
                resolution: step,
            });
        }

        if delta != step {
            let bucket = series[i].timestamp + Duration::seconds(step);
            let arity = series[i].values.len();
            series.insert(i + 1, ResultRow::zeros(bucket, arity));
        }

        i += 1;
    }

    if series.len() > before {
        debug!(
            "Regularized series: {} rows in, {} zero rows inserted",
            before,
            series.len() - before
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn row(s: &str, values: &[f64]) -> ResultRow {
        ResultRow::new(ts(s), values.to_vec())
    }

    #[test]
    fn test_monotonic_closure() {
        // Observations at [0, 180] with 60s buckets close to
        // [0, 60, 120, 180] with the middle rows zero-filled
        let mut series = vec![
            row("2013-06-01 00:00:00", &[3.0, 1.0]),
            row("2013-06-01 00:03:00", &[2.0, 5.0]),
        ];

        regularize(&mut series, 60).unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series[1].timestamp, ts("2013-06-01 00:01:00"));
        assert_eq!(series[1].values, vec![0.0, 0.0]);
        assert_eq!(series[2].timestamp, ts("2013-06-01 00:02:00"));
        assert_eq!(series[2].values, vec![0.0, 0.0]);
        assert_eq!(series[3].values, vec![2.0, 5.0]);
    }

    #[test]
    fn test_spacing_law() {
        let mut series = vec![
            row("2013-06-01 00:00:00", &[1.0]),
            row("2013-06-01 02:00:00", &[1.0]),
            row("2013-06-01 02:30:00", &[1.0]),
            row("2013-06-01 07:30:00", &[1.0]),
        ];

        regularize(&mut series, 1800).unwrap();

        for pair in series.windows(2) {
            assert_eq!(
                (pair[1].timestamp - pair[0].timestamp).num_seconds(),
                1800
            );
        }
        assert_eq!(series.len(), 16);
    }

    #[test]
    fn test_zero_fill_arity_matches() {
        let mut series = vec![
            row("2013-06-01 00:00:00", &[1.0, 2.0, 3.0]),
            row("2013-06-01 00:02:00", &[4.0, 5.0, 6.0]),
        ];

        regularize(&mut series, 60).unwrap();

        for r in &series {
            assert_eq!(r.values.len(), 3);
        }
        assert_eq!(series[1].values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_idempotent_on_regular_series() {
        let mut series = vec![
            row("2013-06-01 00:00:00", &[1.0]),
            row("2013-06-01 00:01:00", &[2.0]),
            row("2013-06-01 00:02:00", &[3.0]),
        ];
        let expected = series.clone();

        regularize(&mut series, 60).unwrap();

        assert_eq!(series, expected);
    }

    #[test]
    fn test_single_row_unchanged() {
        let mut series = vec![row("2013-06-01 00:00:00", &[7.0])];
        let expected = series.clone();

        regularize(&mut series, 60).unwrap();

        assert_eq!(series, expected);
    }

    #[test]
    fn test_empty_input_reports_empty_result_set() {
        let mut series: TimeSeries = vec![];
        let result = regularize(&mut series, 60);
        assert!(matches!(result, Err(SeriesError::EmptyResultSet)));
    }

    #[test]
    fn test_duplicate_timestamp_fails_fast() {
        let mut series = vec![
            row("2013-06-01 00:00:00", &[1.0]),
            row("2013-06-01 00:00:00", &[2.0]),
            row("2013-06-01 00:01:00", &[3.0]),
        ];

        let result = regularize(&mut series, 60);
        assert!(matches!(
            result,
            Err(SeriesError::IrregularResolutionGap { delta: 0, .. })
        ));
    }

    #[test]
    fn test_non_multiple_delta_fails_fast() {
        let mut series = vec![
            row("2013-06-01 00:00:00", &[1.0]),
            row("2013-06-01 00:01:30", &[2.0]),
        ];

        let result = regularize(&mut series, 60);
        assert!(matches!(
            result,
            Err(SeriesError::IrregularResolutionGap { delta: 90, .. })
        ));
    }
}
