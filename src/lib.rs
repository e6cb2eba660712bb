//! Sweepcheck - Combinatorial regression harness for simulation codes
//!
//! Sweepcheck enumerates the Cartesian product of declared option values,
//! edits a solver parameter file for each combination, drives external
//! build and run commands, scrapes error norms from solver output, and
//! checks observed convergence orders against expectations.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): Pure data model and error taxonomy
//! - **Service Layer** (`services`): Expansion, execution, analysis, orchestration
//! - **Infrastructure Layer** (`infrastructure`): Config loading and input parsing
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use sweepcheck::services::{expander, CheckOrchestrator, ExternalRunner, SweepOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = sweepcheck::ConfigLoader::load()?;
//!     let declarations = sweepcheck::infrastructure::declarations::load("combinations.ini".as_ref())?;
//!     let expansion = expander::expand(&declarations, true)?;
//!     let summary = CheckOrchestrator::new(&config, ExternalRunner)
//!         .sweep(&expansion, &SweepOptions::default())
//!         .await?;
//!     println!("{} error(s)", summary.total_errors());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::error::{AnalysisError, ConfigError};
pub use domain::models::{
    AnalysisSeries, CaseOutcome, CaseStatus, Combination, ConvergenceMode, ExecutionResult,
    HarnessConfig, OptionDeclaration, RunSummary, Stage,
};
pub use infrastructure::config::ConfigLoader;
pub use services::{
    expand, CheckOrchestrator, CommandRunner, Expansion, ExternalRunner, ReportAggregator,
    SweepOptions,
};
