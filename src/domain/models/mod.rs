//! Domain models: declarations, combinations, execution results, series,
//! and sweep summaries.

pub mod combination;
pub mod config;
pub mod declaration;
pub mod execution;
pub mod series;
pub mod summary;

pub use combination::Combination;
pub use config::{
    AnalyzeConfig, BuildConfig, ConvergenceConfig, HarnessConfig, RunConfig, DEFAULT_SCAN_WINDOW,
};
pub use declaration::{ExclusionRule, OptionDeclaration};
pub use execution::ExecutionResult;
pub use series::{AnalysisSeries, ConvergenceMode, SeriesPoint};
pub use summary::{CaseOutcome, CaseStatus, RunSummary, Stage};
