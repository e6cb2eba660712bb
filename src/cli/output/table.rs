//! Table output formatting for CLI commands
//!
//! Renders the per-combination sweep summary and expanded combination
//! lists using comfy-table, with color-coded status cells.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{CaseStatus, Combination, RunSummary};

/// Table formatter for CLI output.
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One row per combination, columns for the stage outcomes.
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        let mut table = base_table();
        table.set_header(vec![
            Cell::new("Case").add_attribute(Attribute::Bold),
            Cell::new("Combination").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Failed Stage").add_attribute(Attribute::Bold),
            Cell::new("Max Error").add_attribute(Attribute::Bold),
            Cell::new("Time [s]").add_attribute(Attribute::Bold),
        ]);

        for outcome in &summary.outcomes {
            let status_cell = if self.use_colors {
                Cell::new(outcome.status.as_str()).fg(status_color(outcome.status))
            } else {
                Cell::new(format!(
                    "{} {}",
                    status_icon(outcome.status),
                    outcome.status
                ))
            };

            let stage = outcome
                .failed_stage
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "-".to_string());
            let max_error = outcome
                .max_error
                .map(|e| format!("{:.6e}", e))
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(outcome.index.to_string()),
                Cell::new(&outcome.combination),
                status_cell,
                Cell::new(stage),
                Cell::new(max_error),
                Cell::new(format!("{:.3}", outcome.elapsed_seconds)),
            ]);
        }

        table.to_string()
    }

    /// The expanded combination list, for the `expand` subcommand.
    pub fn format_combinations(&self, combinations: &[Combination]) -> String {
        let mut table = base_table();
        table.set_header(vec![
            Cell::new("Index").add_attribute(Attribute::Bold),
            Cell::new("Combination").add_attribute(Attribute::Bold),
        ]);
        for combination in combinations {
            table.add_row(vec![
                Cell::new(combination.index.to_string()),
                Cell::new(combination.label()),
            ]);
        }
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Check if color output is supported.
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}

fn status_color(status: CaseStatus) -> Color {
    match status {
        CaseStatus::Passed => Color::Green,
        CaseStatus::Failed => Color::Red,
        CaseStatus::Building | CaseStatus::Running | CaseStatus::Analyzing => Color::Cyan,
        CaseStatus::Pending => Color::White,
    }
}

fn status_icon(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Passed => "✓",
        CaseStatus::Failed => "✗",
        CaseStatus::Building | CaseStatus::Running | CaseStatus::Analyzing => "⟳",
        CaseStatus::Pending => "○",
    }
}
