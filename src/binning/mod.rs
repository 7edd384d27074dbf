//! Bin definition resolution.
//!
//! This module turns a user bin selection into an ordered `BinSet`:
//! - Published bins-per-decade size tables (16/32/64/128)
//! - Custom ascending size-bin upper bounds
//! - A discrete integer range of peak locations
//!
//! A `BinSet` is resolved once per run, is immutable afterwards, and is
//! shared by every collection processed in that run.

pub mod presets;

use crate::utils::config::MAX_CUSTOM_BINS;
use crate::utils::error::BinSpecError;
use log::debug;

/// How the user asked for bins
#[derive(Debug, Clone, PartialEq)]
pub enum BinSource {
    /// One of the published bins-per-decade tables (16, 32, 64, or 128)
    Preset(u32),

    /// Ascending upper bounds for custom size bins; a 0 edge is prepended
    /// as the implicit lower bound of the first bin
    SizeEdges(Vec<f64>),

    /// Inclusive integer range of peak locations, one bin per integer
    PeakRange { lower: i64, upper: i64 },
}

/// An ordered, immutable set of bins
#[derive(Debug, Clone, PartialEq)]
pub enum BinSet {
    /// Ascending edges; bin `j` covers `[edges[j], edges[j+1]]` inclusive
    /// of both ends
    Continuous(Vec<f64>),

    /// Pairwise-distinct integer match values
    Discrete(Vec<i64>),
}

impl BinSet {
    /// Number of bins (one less than the edge count for continuous sets)
    pub fn len(&self) -> usize {
        match self {
            BinSet::Continuous(edges) => edges.len().saturating_sub(1),
            BinSet::Discrete(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One human-readable label per bin, in bin order
    ///
    /// Continuous bins label as `"{lower}-{upper}"` with each edge in its
    /// natural decimal form (`0.010` renders as `0.01`); discrete bins
    /// label as the integer itself.
    pub fn labels(&self) -> Vec<String> {
        match self {
            BinSet::Continuous(edges) => edges
                .windows(2)
                .map(|pair| format!("{}-{}", pair[0], pair[1]))
                .collect(),
            BinSet::Discrete(values) => values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Resolve a bin selection into a `BinSet`
///
/// # Errors
/// * `BinSpecError::UnknownPreset` - no published table for the choice
/// * `BinSpecError::Empty` - no custom edges supplied
/// * `BinSpecError::NotAscending` - custom edges not strictly increasing
/// * `BinSpecError::InvertedRange` - peak range with lower > upper
pub fn resolve_bins(source: &BinSource) -> Result<BinSet, BinSpecError> {
    match source {
        BinSource::Preset(choice) => {
            let table = presets::decade_table(*choice)
                .ok_or(BinSpecError::UnknownPreset(*choice))?;
            debug!("Using {} bins-per-decade table ({} bins)", choice, table.len() - 1);
            Ok(BinSet::Continuous(table.to_vec()))
        }

        BinSource::SizeEdges(uppers) => {
            if uppers.is_empty() {
                return Err(BinSpecError::Empty);
            }
            if uppers.len() > MAX_CUSTOM_BINS {
                return Err(BinSpecError::Unparsable(format!(
                    "too many size bins ({}, max {})",
                    uppers.len(),
                    MAX_CUSTOM_BINS
                )));
            }

            // Prepend the implicit 0 lower bound, then require strict ascent
            let mut edges = Vec::with_capacity(uppers.len() + 1);
            edges.push(0.0);
            for &upper in uppers {
                let prev = *edges.last().unwrap_or(&0.0);
                if upper <= prev {
                    return Err(BinSpecError::NotAscending { prev, next: upper });
                }
                edges.push(upper);
            }
            debug!("Resolved {} custom size bins", edges.len() - 1);
            Ok(BinSet::Continuous(edges))
        }

        BinSource::PeakRange { lower, upper } => {
            if lower > upper {
                return Err(BinSpecError::InvertedRange {
                    lower: *lower,
                    upper: *upper,
                });
            }
            let values: Vec<i64> = (*lower..=*upper).collect();
            debug!("Resolved peak range {}..={} ({} bins)", lower, upper, values.len());
            Ok(BinSet::Discrete(values))
        }
    }
}

/// Parse a comma-separated list of size-bin upper bounds
///
/// # Errors
/// * `BinSpecError::Unparsable` - a token is not a number
pub fn parse_size_edges(input: &str) -> Result<Vec<f64>, BinSpecError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| BinSpecError::Unparsable(tok.to_string()))
        })
        .collect()
}

/// Parse a `lower:upper` peak-location range
///
/// # Errors
/// * `BinSpecError::Unparsable` - missing separator or non-integer bound
pub fn parse_peak_range(input: &str) -> Result<(i64, i64), BinSpecError> {
    let (lo, hi) = input
        .split_once(':')
        .ok_or_else(|| BinSpecError::Unparsable(input.to_string()))?;
    let lower = lo
        .trim()
        .parse::<i64>()
        .map_err(|_| BinSpecError::Unparsable(lo.to_string()))?;
    let upper = hi
        .trim()
        .parse::<i64>()
        .map_err(|_| BinSpecError::Unparsable(hi.to_string()))?;
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_bin_count() {
        let bins = resolve_bins(&BinSource::Preset(16)).unwrap();
        assert_eq!(bins.len(), 49);
        let bins = resolve_bins(&BinSource::Preset(64)).unwrap();
        assert_eq!(bins.len(), 193);
    }

    #[test]
    fn test_unknown_preset() {
        let result = resolve_bins(&BinSource::Preset(24));
        assert!(matches!(result, Err(BinSpecError::UnknownPreset(24))));
    }

    #[test]
    fn test_custom_edges_prepend_zero() {
        let bins = resolve_bins(&BinSource::SizeEdges(vec![0.5, 1.0, 2.5])).unwrap();
        assert_eq!(bins, BinSet::Continuous(vec![0.0, 0.5, 1.0, 2.5]));
        assert_eq!(bins.len(), 3);
    }

    #[test]
    fn test_custom_edges_not_ascending() {
        let result = resolve_bins(&BinSource::SizeEdges(vec![0.5, 0.5]));
        assert!(matches!(result, Err(BinSpecError::NotAscending { .. })));

        // First edge must clear the implicit 0 lower bound
        let result = resolve_bins(&BinSource::SizeEdges(vec![0.0, 1.0]));
        assert!(matches!(result, Err(BinSpecError::NotAscending { .. })));
    }

    #[test]
    fn test_custom_edges_empty() {
        let result = resolve_bins(&BinSource::SizeEdges(vec![]));
        assert!(matches!(result, Err(BinSpecError::Empty)));
    }

    #[test]
    fn test_peak_range() {
        let bins = resolve_bins(&BinSource::PeakRange { lower: -3, upper: 2 }).unwrap();
        assert_eq!(bins, BinSet::Discrete(vec![-3, -2, -1, 0, 1, 2]));
    }

    #[test]
    fn test_peak_range_single_value() {
        let bins = resolve_bins(&BinSource::PeakRange { lower: 7, upper: 7 }).unwrap();
        assert_eq!(bins.len(), 1);
    }

    #[test]
    fn test_peak_range_inverted() {
        let result = resolve_bins(&BinSource::PeakRange { lower: 5, upper: 4 });
        assert!(matches!(
            result,
            Err(BinSpecError::InvertedRange { lower: 5, upper: 4 })
        ));
    }

    #[test]
    fn test_continuous_labels_natural_decimal() {
        let bins = BinSet::Continuous(vec![0.0, 0.010, 0.012]);
        assert_eq!(bins.labels(), vec!["0-0.01", "0.01-0.012"]);
    }

    #[test]
    fn test_discrete_labels() {
        let bins = BinSet::Discrete(vec![5, 7]);
        assert_eq!(bins.labels(), vec!["5", "7"]);
    }

    #[test]
    fn test_parse_size_edges() {
        assert_eq!(
            parse_size_edges("0.1, 0.5,1.0").unwrap(),
            vec![0.1, 0.5, 1.0]
        );
        assert!(parse_size_edges("0.1,abc").is_err());
    }

    #[test]
    fn test_parse_peak_range() {
        assert_eq!(parse_peak_range("10:250").unwrap(), (10, 250));
        assert_eq!(parse_peak_range("-50:50").unwrap(), (-50, 50));
        assert!(parse_peak_range("10-250").is_err());
        assert!(parse_peak_range("10:x").is_err());
    }
}
