//! Output formatting and file writers.
//!
//! This module renders regularized series into text tables and persists
//! them as comma-delimited files, one per collection.

pub mod csv;
pub mod table;

// Re-export main functions
pub use csv::{histogram_filename, write_table};
pub use table::{build_table, OutputTable};
