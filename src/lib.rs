//! Particle Histogram
//!
//! Binned time-series histogram export for particle-analysis measurement
//! collections: pick collections, a metric, a bin scheme, and a time
//! resolution, and get one gap-free CSV table per collection.
//!
//! This crate provides the core implementation for the
//! `particle-hist` CLI tool.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install particle-histogram
//! particle-hist --help
//! ```

pub mod binning;
pub mod commands;
pub mod output;
pub mod query;
pub mod series;
pub mod store;
pub mod utils;
