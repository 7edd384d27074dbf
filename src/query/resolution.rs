//! Time-bucket resolution decomposition.
//!
//! A resolution of `R` seconds is decomposed into one truncation rule per
//! clock field (hour, minute, second) so a timestamp can be snapped to the
//! start of its `R`-second bucket using only per-field integer arithmetic:
//!
//! - `R >= 3600`: hour truncated by `R/3600`, minute and second zeroed
//! - `60 <= R < 3600`: hour kept, minute truncated by `R/60`, second zeroed
//! - `R < 60`: hour and minute kept, second truncated by `R`
//!
//! Resolutions that do not decompose evenly into these units (45 seconds,
//! 90 minutes, ...) truncate each field independently, which distorts the
//! bucket width across field boundaries. The distortion is accepted
//! silently rather than rejected; resolutions are expected to divide an
//! hour evenly or be a whole number of hours.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Truncation rule for a single clock field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Field passes through untouched
    Keep,

    /// Field is forced to the bucket start
    Zero,

    /// Field is integer-divided by the divisor, then multiplied back
    Truncate(u32),
}

impl FieldRule {
    /// Snap a field value to its bucket start
    pub fn apply(&self, value: u32) -> u32 {
        match self {
            FieldRule::Keep => value,
            FieldRule::Zero => 0,
            FieldRule::Truncate(divisor) => (value / divisor) * divisor,
        }
    }
}

/// Field rules for one bucket resolution
///
/// Computed once per run and shared, read-only, by every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeResolutionSpec {
    seconds: u32,
    hour: FieldRule,
    minute: FieldRule,
    second: FieldRule,
}

impl TimeResolutionSpec {
    /// Decompose a bucket width in seconds into per-field rules
    ///
    /// `seconds` must be at least 1; CLI validation enforces this before
    /// any spec is built.
    pub fn new(seconds: u32) -> Self {
        let (hour, minute, second) = if seconds >= 3600 {
            (FieldRule::Truncate(seconds / 3600), FieldRule::Zero, FieldRule::Zero)
        } else if seconds >= 60 {
            (FieldRule::Keep, FieldRule::Truncate(seconds / 60), FieldRule::Zero)
        } else {
            (FieldRule::Keep, FieldRule::Keep, FieldRule::Truncate(seconds.max(1)))
        };

        Self {
            seconds,
            hour,
            minute,
            second,
        }
    }

    /// The bucket width in seconds
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Snap a timestamp to the start of its bucket
    pub fn truncate(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let time = timestamp.time();
        let truncated = NaiveTime::from_hms_opt(
            self.hour.apply(time.hour()),
            self.minute.apply(time.minute()),
            self.second.apply(time.second()),
        )
        // Truncation can only lower valid field values, so this never
        // actually falls back
        .unwrap_or(time);
        NaiveDateTime::new(timestamp.date(), truncated)
    }
}
