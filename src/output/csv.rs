//! CSV writer for output tables.
//!
//! One file per collection, named `histogram_<collection>_<code>.csv` from
//! the collection name and the metric's one-letter code.

use super::table::OutputTable;
use crate::query::request::MetricKind;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Deterministic output filename for one collection's table
pub fn histogram_filename(collection: &str, metric: MetricKind) -> String {
    format!("histogram_{}_{}.csv", collection, metric.code())
}

/// Write a table as comma-delimited text
///
/// # Arguments
/// * `table` - header and rows to write
/// * `output_path` - destination file; parent directories are created
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - empty path, or path is a directory
pub fn write_table(table: &OutputTable, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", table.header.join(","))?;
    for row in &table.rows {
        writeln!(writer, "{}", row.join(","))?;
    }
    writer.flush()?;

    info!(
        "Wrote {} rows to {} ({} bytes)",
        table.len(),
        output_path.display(),
        file_size(output_path)
    );

    Ok(())
}

/// Validate that the output path is usable
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> OutputTable {
        OutputTable {
            header: vec!["Date".into(), "StartTime".into(), "5".into()],
            rows: vec![
                vec!["2013-06-01".into(), "00:00:00".into(), "2".into()],
                vec!["2013-06-01".into(), "00:01:00".into(), "0".into()],
            ],
        }
    }

    #[test]
    fn test_histogram_filename() {
        assert_eq!(
            histogram_filename("ambient_week1", MetricKind::PeakCount),
            "histogram_ambient_week1_C.csv"
        );
        assert_eq!(
            histogram_filename("test", MetricKind::SizeCount),
            "histogram_test_S.csv"
        );
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_table(&sample_table(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Date,StartTime,5\n2013-06-01,00:00:00,2\n2013-06-01,00:01:00,0\n"
        );
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/dirs/out.csv");

        write_table(&sample_table(), &nested).unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn test_write_rejects_empty_path() {
        let result = write_table(&sample_table(), Path::new(""));
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }

    #[test]
    fn test_write_rejects_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_table(&sample_table(), dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
