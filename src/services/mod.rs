//! Service layer: expansion, execution, analysis, and reporting.

pub mod analyzer;
pub mod convergence;
pub mod expander;
pub mod orchestrator;
pub mod parameter_file;
pub mod report;
pub mod runner;

pub use expander::{expand, Expansion};
pub use orchestrator::{CheckOrchestrator, SweepOptions};
pub use report::ReportAggregator;
pub use runner::{CommandRunner, ExternalRunner};
