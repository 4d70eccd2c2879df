//! Main pipeline for the epi-trend crates.
//!
//! Orchestrates loading, country normalization, aggregation and metric
//! derivation, returning a [`PipelineResult`] ready for rendering.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use trend_core::error::Result;
use trend_core::metrics::MetricsCalculator;
use trend_core::models::CountryDayMetrics;
use trend_core::normalize::normalize_records;

use crate::aggregator::DailyAggregator;
use crate::reader::load_daily_cases;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the pipeline result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of snapshot files read.
    pub files_read: usize,
    /// Total number of raw records ingested.
    pub records_read: usize,
    /// Number of distinct canonical countries in the output.
    pub countries: usize,
    /// Number of (country, date) rows in the output table.
    pub rows: usize,
    /// Rows whose outstanding count is negative (inconsistent source data).
    pub negative_outstanding_rows: usize,
    /// Wall-clock seconds spent reading the snapshot files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent on normalize + aggregate + derive.
    pub transform_time_seconds: f64,
}

/// The complete output of [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One row per (country, date), sorted by (country, date).
    pub rows: Vec<CountryDayMetrics>,
    /// Metadata about this run.
    pub metadata: PipelineMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline against a data checkout.
///
/// 1. Load every daily snapshot under `root`.
/// 2. Normalize raw country labels to canonical names.
/// 3. Aggregate to (date, country) granularity.
/// 4. Derive day-over-day metrics.
///
/// Structural failures (undatable filename, unparseable snapshot, missing
/// data path) abort the run; numeric edge cases are normalized in place and
/// never surface as errors.
pub fn run_pipeline(root: &Path) -> Result<PipelineResult> {
    // ── Step 1: Load snapshots ────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let batch = load_daily_cases(root)?;
    let load_time = load_start.elapsed().as_secs_f64();
    let records_read = batch.records.len();

    // ── Step 2-4: Normalize, aggregate, derive ────────────────────────────────
    let transform_start = std::time::Instant::now();
    let normalized = normalize_records(batch.records);
    let aggregates = DailyAggregator::aggregate(&normalized);
    info!("Daily data aggregated: {} country-day rows", aggregates.len());

    let negative_outstanding_rows = aggregates.iter().filter(|r| r.outstanding < 0).count();
    let rows = MetricsCalculator::derive(aggregates);
    let transform_time = transform_start.elapsed().as_secs_f64();

    // ── Step 5: Build result ──────────────────────────────────────────────────
    let countries = rows
        .iter()
        .map(|r| r.country.as_str())
        .collect::<HashSet<_>>()
        .len();

    let metadata = PipelineMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_read: batch.files_read,
        records_read,
        countries,
        rows: rows.len(),
        negative_outstanding_rows,
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(PipelineResult { rows, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
