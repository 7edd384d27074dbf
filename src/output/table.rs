//! Tabular rendering of a regularized series.
//!
//! Conversion to text happens here and nowhere earlier: upstream stages
//! work on typed timestamps and numeric vectors, and this step renders
//! them once into the header + rows shape the writers consume.

use crate::series::TimeSeries;
use crate::utils::config::{DATE_LABEL, START_TIME_LABEL};

/// Header row plus text data rows, ready for delimited output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render a regularized series and its bin labels as a text table
///
/// Header is `[Date, StartTime]` followed by one label per bin; each data
/// row is the bucket's date part, time part, then the aggregates in their
/// natural decimal form.
pub fn build_table(series: &TimeSeries, bin_labels: &[String]) -> OutputTable {
    let mut header = Vec::with_capacity(bin_labels.len() + 2);
    header.push(DATE_LABEL.to_string());
    header.push(START_TIME_LABEL.to_string());
    header.extend(bin_labels.iter().cloned());

    let rows = series
        .iter()
        .map(|row| {
            let mut fields = Vec::with_capacity(row.values.len() + 2);
            fields.push(row.timestamp.format("%Y-%m-%d").to_string());
            fields.push(row.timestamp.format("%H:%M:%S").to_string());
            fields.extend(row.values.iter().map(|v| v.to_string()));
            fields
        })
        .collect();

    OutputTable { header, rows }
}
