//! Serializable summaries of sweeps and batches.
//!
//! The `Display` impls print the plain-text report the CLI shows: one
//! `found   percent%` line per image, then the "Scan Times" table.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::encoder::SymbolType;
use crate::sweep::{SweepRecord, FULL_TURN};

/// Decode latency over one sweep, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
}

impl LatencyStats {
    /// `None` for an empty input.
    pub fn from_durations<I>(durations: I) -> Option<Self>
    where
        I: IntoIterator<Item = Duration>,
    {
        let mut ms: Vec<f64> = durations
            .into_iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();
        if ms.is_empty() {
            return None;
        }
        ms.sort_by(f64::total_cmp);

        let n = ms.len();
        let median_ms = if n % 2 == 1 {
            ms[n / 2]
        } else {
            (ms[n / 2 - 1] + ms[n / 2]) / 2.0
        };
        Some(Self {
            min_ms: ms[0],
            max_ms: ms[n - 1],
            mean_ms: ms.iter().sum::<f64>() / n as f64,
            median_ms,
        })
    }
}

/// What a single sweep amounted to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub label: String,
    pub width: usize,
    pub height: usize,
    pub total_found: usize,
    pub success_ratio: f64,
    pub failed_angles: usize,
    pub latency: Option<LatencyStats>,
    /// Inclusive `[start, end]` degree runs that decoded.
    pub decodable_ranges: Vec<(u16, u16)>,
    /// Valid results per degree, indexed 0..360.
    pub found_per_angle: Vec<usize>,
}

impl From<&SweepRecord> for SweepSummary {
    fn from(record: &SweepRecord) -> Self {
        Self {
            label: record.source.label.clone(),
            width: record.source.width,
            height: record.source.height,
            total_found: record.total_found(),
            success_ratio: record.success_ratio(),
            failed_angles: record.failed_angles(),
            latency: record.latency(),
            decodable_ranges: record.decodable_ranges(),
            found_per_angle: record.samples.iter().map(|s| s.found).collect(),
        }
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}   {:.2}%", self.total_found, self.success_ratio * 100.0)
    }
}

/// A batch job that never produced a base image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedJob {
    pub label: String,
    pub symbol: SymbolType,
    pub reason: String,
}

/// Every sweep in a batch plus the jobs that were skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub angles_per_sweep: usize,
    pub sweeps: Vec<SweepSummary>,
    pub skipped: Vec<SkippedJob>,
}

impl BatchReport {
    pub fn new(sweeps: Vec<SweepSummary>, skipped: Vec<SkippedJob>) -> Self {
        Self {
            angles_per_sweep: FULL_TURN,
            sweeps,
            skipped,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .sweeps
            .iter()
            .map(|s| s.label.len())
            .max()
            .unwrap_or(0);

        for sweep in &self.sweeps {
            writeln!(f, "{:<width$}  {}", sweep.label, sweep, width = width)?;
        }
        for job in &self.skipped {
            writeln!(f, "skipped {} ({}): {}", job.label, job.symbol, job.reason)?;
        }

        writeln!(f, "Scan Times")?;
        for sweep in &self.sweeps {
            match sweep.latency {
                Some(stats) => writeln!(
                    f,
                    "  {:<width$}  {:.3} ms - {:.3} ms",
                    sweep.label,
                    stats.min_ms,
                    stats.max_ms,
                    width = width
                )?,
                None => writeln!(f, "  {:<width$}  n/a", sweep.label, width = width)?,
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
