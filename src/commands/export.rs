//! Export command implementation.
//!
//! The export command:
//! 1. Resolves the bin definition
//! 2. Decomposes the time resolution
//! 3. Loads the event store
//! 4. Per collection: synthesizes the aggregation request, runs it,
//!    regularizes the series, and writes the CSV table
//!
//! Bin and resolution failures abort the whole run (they are shared
//! preconditions); a failure inside one collection is reported and the
//! remaining collections still run.

use crate::binning::{resolve_bins, BinSet, BinSource};
use crate::output::{build_table, histogram_filename, write_table};
use crate::query::request::{build_request, MetricKind, TimeWindow};
use crate::query::resolution::TimeResolutionSpec;
use crate::series::regularize;
use crate::store::{MemoryStore, QueryExecutor};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, error, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the export command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ExportArgs {
    /// Path to the JSON event file
    pub input: PathBuf,

    /// Collection names to process, in order
    pub collections: Vec<String>,

    /// Aggregate applied per bin per bucket
    pub metric: MetricKind,

    /// Bin selection (preset table, custom edges, or peak range)
    pub bins: BinSource,

    /// Time bucket width in seconds
    pub resolution_secs: u32,

    /// Optional window start (defaults to the store minimum)
    pub start: Option<NaiveDateTime>,

    /// Optional window end (defaults to the store maximum)
    pub end: Option<NaiveDateTime>,

    /// Directory the CSV files are written into
    pub output_dir: PathBuf,

    /// Print a per-collection summary to stdout
    pub print_summary: bool,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("events.json"),
            collections: Vec::new(),
            metric: MetricKind::SizeCount,
            bins: BinSource::Preset(16),
            resolution_secs: 3600,
            start: None,
            end: None,
            output_dir: PathBuf::from("."),
            print_summary: false,
        }
    }
}

/// Validate export arguments
///
/// **Public** - called before execute_export for early validation
///
/// # Errors
/// Returns a message describing the first invalid argument.
pub fn validate_args(args: &ExportArgs) -> Result<()> {
    if args.collections.is_empty() {
        anyhow::bail!("At least one --collection is required");
    }

    if args.resolution_secs == 0 {
        anyhow::bail!("Time resolution must be at least 1 second");
    }

    // The metric decides which attribute is binned, so the bin source
    // must agree with it
    match (&args.bins, args.metric.is_size_metric()) {
        (BinSource::PeakRange { .. }, true) => {
            anyhow::bail!("Metric size-count requires size bins (--bins or --size-bins)")
        }
        (BinSource::Preset(_) | BinSource::SizeEdges(_), false) => {
            anyhow::bail!(
                "Metric {:?} bins peak locations; use --peak-range",
                args.metric
            )
        }
        _ => {}
    }

    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            anyhow::bail!("Window start {} is after end {}", start, end);
        }
    }

    Ok(())
}

/// Execute the export command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Bin or resolution failures (shared preconditions)
/// * Event file load failures
/// * Every requested collection failing
pub fn execute_export(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Starting export for {} collections", args.collections.len());

    // Step 1: Resolve bins (shared across all collections)
    info!("Step 1/4: Resolving bin definition...");
    let bins = resolve_bins(&args.bins).context("Failed to resolve bin definition")?;
    let labels = bins.labels();
    debug!("Resolved {} bins", bins.len());

    // Step 2: Decompose the time resolution (shared)
    info!("Step 2/4: Decomposing {}s time resolution...", args.resolution_secs);
    let resolution = TimeResolutionSpec::new(args.resolution_secs);

    // Step 3: Load the event store
    info!("Step 3/4: Loading event store...");
    let store = MemoryStore::load(&args.input)
        .with_context(|| format!("Failed to load event file {}", args.input.display()))?;

    let window = match (args.start, args.end) {
        (None, None) => TimeWindow::unbounded(),
        (start, end) => {
            let unbounded = TimeWindow::unbounded();
            TimeWindow::new(start.unwrap_or(unbounded.start), end.unwrap_or(unbounded.end))
        }
    };

    // Step 4: Process collections in order
    info!("Step 4/4: Processing collections...");
    let mut written = 0usize;

    for name in &args.collections {
        match export_collection(&store, name, &args, &bins, &labels, resolution, window) {
            Ok(path) => {
                info!("✓ CSV saved as: {}", path.display());
                written += 1;
            }
            Err(err) => {
                error!("✗ Collection '{}' skipped: {:#}", name, err);
            }
        }
    }

    if written == 0 {
        anyhow::bail!("All {} collections failed", args.collections.len());
    }

    let elapsed = start_time.elapsed();
    info!(
        "Export completed in {:.2}s ({}/{} collections written)",
        elapsed.as_secs_f64(),
        written,
        args.collections.len()
    );

    Ok(())
}

/// Run the full pipeline for one collection
///
/// **Private** - per-collection worker for execute_export
fn export_collection(
    store: &MemoryStore,
    name: &str,
    args: &ExportArgs,
    bins: &BinSet,
    labels: &[String],
    resolution: TimeResolutionSpec,
    window: TimeWindow,
) -> Result<PathBuf> {
    info!("Processing collection '{}'...", name);

    let id = store
        .resolve_collection(name)
        .context("Failed to resolve collection")?;

    let request = build_request(id, args.metric, bins, resolution, window);

    let timer = Instant::now();
    let mut series = store.run(&request).context("Aggregation query failed")?;
    info!("Querying took {:.3}s", timer.elapsed().as_secs_f64());

    let timer = Instant::now();
    regularize(&mut series, args.resolution_secs)
        .context("Failed to regularize time series")?;

    let table = build_table(&series, labels);

    let path = args
        .output_dir
        .join(histogram_filename(name, args.metric));
    write_table(&table, &path).context("Failed to write CSV")?;
    info!("Post-processing took {:.3}s", timer.elapsed().as_secs_f64());

    if args.print_summary {
        println!("\n{}", "=".repeat(60));
        println!("COLLECTION: {}", name);
        println!("{}", "=".repeat(60));
        println!("Buckets:  {}", series.len());
        println!("Bins:     {}", labels.len());
        println!("From:     {}", series[0].timestamp);
        println!("To:       {}", series[series.len() - 1].timestamp);
        println!("Output:   {}", path.display());
    }

    Ok(path)
}
