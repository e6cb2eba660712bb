//! Per-case state machine and sweep-level aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one combination in the build/run/analyze pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Not dispatched yet (or dry-run: commands printed only).
    Pending,
    /// Build commands are executing.
    Building,
    /// The external run command is executing.
    Running,
    /// Captured output is being analyzed.
    Analyzing,
    /// All stages succeeded.
    Passed,
    /// Some stage failed; later stages were skipped.
    Failed,
}

impl Default for CaseStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::Running => "running",
            Self::Analyzing => "analyzing",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Valid transitions from this status. A build failure skips straight
    /// to `Failed`; a skipped build stage goes `Pending -> Running`; a run
    /// with no analysis configured goes `Running -> Passed`.
    pub fn valid_transitions(&self) -> Vec<CaseStatus> {
        match self {
            Self::Pending => vec![Self::Building, Self::Running],
            Self::Building => vec![Self::Running, Self::Failed],
            Self::Running => vec![Self::Analyzing, Self::Passed, Self::Failed],
            Self::Analyzing => vec![Self::Passed, Self::Failed],
            Self::Passed | Self::Failed => vec![],
        }
    }

    pub fn can_transition_to(&self, next: Self) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Build,
    Run,
    Analyze,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Run => "run",
            Self::Analyze => "analyze",
        }
    }
}

/// Terminal record for one combination.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    /// Position in the expansion order.
    pub index: usize,
    /// Human-readable combination, e.g. `N=2, p=3`.
    pub combination: String,
    pub status: CaseStatus,
    /// Stage the failure is attributed to, if any.
    pub failed_stage: Option<Stage>,
    /// Failure context (command or label involved).
    pub message: Option<String>,
    /// Wall time spent on this case across all stages.
    pub elapsed_seconds: f64,
    /// Largest scraped error value, when analysis ran.
    pub max_error: Option<f64>,
}

/// Aggregate counts and outcomes for one whole sweep. Read-only once the
/// sweep completes.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub build_errors: usize,
    pub run_errors: usize,
    pub analyze_errors: usize,
    pub outcomes: Vec<CaseOutcome>,
    /// Convergence-group failures that are not attributable to a single
    /// case (order below threshold across a series).
    pub group_failures: Vec<String>,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            build_errors: 0,
            run_errors: 0,
            analyze_errors: 0,
            outcomes: Vec::new(),
            group_failures: Vec::new(),
            elapsed_seconds: 0.0,
        }
    }

    pub fn total_errors(&self) -> usize {
        self.build_errors + self.run_errors + self.analyze_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failure_skips_run_and_analyze() {
        assert!(CaseStatus::Building.can_transition_to(CaseStatus::Failed));
        assert!(!CaseStatus::Building.can_transition_to(CaseStatus::Analyzing));
        assert!(!CaseStatus::Building.can_transition_to(CaseStatus::Passed));
    }

    #[test]
    fn skipped_build_goes_straight_to_running() {
        assert!(CaseStatus::Pending.can_transition_to(CaseStatus::Running));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        assert!(CaseStatus::Passed.is_terminal());
        assert!(CaseStatus::Failed.is_terminal());
        assert!(CaseStatus::Passed.valid_transitions().is_empty());
        assert!(!CaseStatus::Analyzing.is_terminal());
    }

    #[test]
    fn total_errors_sums_all_stages() {
        let mut summary = RunSummary::new(Utc::now());
        summary.build_errors = 1;
        summary.run_errors = 2;
        summary.analyze_errors = 3;
        assert_eq!(summary.total_errors(), 6);
    }
}
