//! Sweep reporting and the final verdict.
//!
//! The aggregator is the single authoritative point deciding overall
//! sweep success: exit code 1 when any error count is nonzero, else 0.
//! No other component declares the final verdict.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::models::RunSummary;

/// Collects per-combination outcomes into CSV/JSON artifacts and the
/// final success/failure verdict.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Write one row per combination with fixed-width scientific-notation
    /// numeric columns.
    pub fn write_csv(summary: &RunSummary, path: &Path) -> Result<()> {
        let mut out = String::from("index,combination,status,failed_stage,max_error,elapsed_seconds\n");
        for outcome in &summary.outcomes {
            let max_error = outcome
                .max_error
                .map(|e| format!("{:14.6e}", e))
                .unwrap_or_else(|| format!("{:>14}", "-"));
            let stage = outcome
                .failed_stage
                .map(|s| s.as_str())
                .unwrap_or("-");
            out.push_str(&format!(
                "{},\"{}\",{},{},{},{:14.6e}\n",
                outcome.index,
                outcome.combination,
                outcome.status,
                stage,
                max_error,
                outcome.elapsed_seconds,
            ));
        }
        std::fs::write(path, out)
            .with_context(|| format!("writing summary CSV to {}", path.display()))?;
        tracing::info!(path = %path.display(), rows = summary.outcomes.len(), "summary CSV written");
        Ok(())
    }

    /// Machine-readable summary for the global `--json` flag.
    pub fn to_json(summary: &RunSummary) -> Result<String> {
        serde_json::to_string_pretty(summary).context("serializing run summary")
    }

    /// Print the totals and return the process exit code: `1` when any
    /// error count is nonzero, else `0`. Total elapsed wall time is always
    /// reported.
    pub fn finalize(summary: &RunSummary) -> i32 {
        for failure in &summary.group_failures {
            println!("convergence failure: {}", failure);
        }
        println!(
            "{} error(s) total (build {}, run {}, analyze {})",
            summary.total_errors(),
            summary.build_errors,
            summary.run_errors,
            summary.analyze_errors,
        );
        println!("total elapsed: {:.3} s", summary.elapsed_seconds);

        if summary.total_errors() > 0 {
            1
        } else {
            0
        }
    }
}
