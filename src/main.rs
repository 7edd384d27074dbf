//! Particle Histogram CLI
//!
//! Converts time-stamped particle-analysis measurement collections into
//! regularized, binned time-series histograms exported as CSV.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use particle_histogram::binning::{parse_peak_range, parse_size_edges, presets, BinSource};
use particle_histogram::commands::{execute_export, validate_args, ExportArgs};
use particle_histogram::query::request::MetricKind;
use particle_histogram::utils::config::TIME_FORMAT;

/// Particle Histogram - binned time-series export for measurement collections
#[derive(Parser, Debug)]
#[command(name = "particle-hist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export binned histograms for one or more collections
    Export {
        /// Path to the JSON event file
        #[arg(short, long, default_value = "events.json")]
        input: PathBuf,

        /// Collection name to process (repeat for several)
        #[arg(short, long = "collection", required = true)]
        collections: Vec<String>,

        /// Metric: size-count, peak-count, height-sum, area-sum, rel-area-sum
        #[arg(short, long, default_value = "size-count")]
        metric: MetricKind,

        /// Published size table: 16, 32, 64, or 128 bins per decade
        #[arg(long, conflicts_with_all = ["size_bins", "peak_range"])]
        bins: Option<u32>,

        /// Custom size bins: comma-separated ascending upper bounds
        #[arg(long, conflicts_with = "peak_range")]
        size_bins: Option<String>,

        /// Peak-location range as lower:upper (for the peak metrics)
        #[arg(long)]
        peak_range: Option<String>,

        /// Time bucket width in seconds
        #[arg(short, long, default_value = "3600")]
        resolution: u32,

        /// Window start, "YYYY-MM-DD hh:mm:ss" (default: all data)
        #[arg(long)]
        start: Option<String>,

        /// Window end, "YYYY-MM-DD hh:mm:ss" (default: all data)
        #[arg(long)]
        end: Option<String>,

        /// Directory the CSV files are written into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Print a per-collection summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Display a published bins-per-decade table
    Bins {
        /// Table to display: 16, 32, 64, or 128
        #[arg(default_value = "16")]
        choice: u32,

        /// Print every edge instead of a summary
        #[arg(long)]
        full: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Export {
            input,
            collections,
            metric,
            bins,
            size_bins,
            peak_range,
            resolution,
            start,
            end,
            output_dir,
            summary,
        } => {
            let bin_source = select_bin_source(metric, bins, size_bins, peak_range)?;

            let args = ExportArgs {
                input,
                collections,
                metric,
                bins: bin_source,
                resolution_secs: resolution,
                start: parse_bound(start.as_deref(), "--start")?,
                end: parse_bound(end.as_deref(), "--end")?,
                output_dir,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute export
            execute_export(args)?;
        }

        Commands::Bins { choice, full } => {
            display_bins(choice, full)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Derive the bin source from the mutually exclusive CLI options
///
/// **Private** - size metrics default to the 16 bins-per-decade table;
/// peak metrics require an explicit --peak-range
fn select_bin_source(
    metric: MetricKind,
    bins: Option<u32>,
    size_bins: Option<String>,
    peak_range: Option<String>,
) -> Result<BinSource> {
    if let Some(range) = peak_range {
        let (lower, upper) = parse_peak_range(&range).context("Invalid --peak-range")?;
        return Ok(BinSource::PeakRange { lower, upper });
    }

    if let Some(edges) = size_bins {
        let uppers = parse_size_edges(&edges).context("Invalid --size-bins")?;
        return Ok(BinSource::SizeEdges(uppers));
    }

    if let Some(choice) = bins {
        return Ok(BinSource::Preset(choice));
    }

    if metric.is_size_metric() {
        Ok(BinSource::Preset(16))
    } else {
        anyhow::bail!("Metric {:?} requires --peak-range", metric)
    }
}

/// Parse an optional window bound
///
/// **Private** - internal helper for main
fn parse_bound(value: Option<&str>, flag: &str) -> Result<Option<chrono::NaiveDateTime>> {
    value
        .map(|s| {
            chrono::NaiveDateTime::parse_from_str(s, TIME_FORMAT)
                .with_context(|| format!("{flag} must be \"YYYY-MM-DD hh:mm:ss\", got \"{s}\""))
        })
        .transpose()
}

/// Display a published bin table
///
/// **Private** - internal command implementation
fn display_bins(choice: u32, full: bool) -> Result<()> {
    let table = presets::decade_table(choice).with_context(|| {
        format!(
            "No published table for {} bins per decade (choices: 16, 32, 64, 128)",
            choice
        )
    })?;

    println!("{} bins-per-decade table", choice);
    println!("Bins:  {}", table.len() - 1);
    println!("Range: {} to {} (leading 0 edge prepended)", table[1], table[table.len() - 1]);

    if full {
        println!();
        for (i, pair) in table.windows(2).enumerate() {
            println!("  bin {:>3}: {}-{}", i + 1, pair[0], pair[1]);
        }
    } else {
        println!("Use --full to print every edge");
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Particle Histogram v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Binned time-series histogram export for particle-analysis collections.");
}
