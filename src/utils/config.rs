//! Configuration and constants for the CLI.

/// Label of the leading date column in every output table
pub const DATE_LABEL: &str = "Date";

/// Label of the bucket start-time column in every output table
pub const START_TIME_LABEL: &str = "StartTime";

/// Timestamp format accepted on the command line for --start/--end
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Sentinel bounds used when no explicit time window is given.
// These match the narrowest and widest dates the source store accepts.
pub const MIN_STORE_TIME: &str = "1753-01-01 00:00:00";
pub const MAX_STORE_TIME: &str = "9999-12-31 23:59:59";

/// Upper limit on user-supplied custom size bins
pub const MAX_CUSTOM_BINS: usize = 1024;
