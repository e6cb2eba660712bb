//! Error taxonomy for the harness.
//!
//! Only `ConfigError`-class problems stop a sweep before (or instead of)
//! execution. Launch and runtime failures of external commands are data on
//! [`crate::domain::models::ExecutionResult`], and analysis problems are
//! attributed to the specific combination and folded into the aggregate
//! counts.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, detected before any execution.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate option declaration: '{0}'")]
    DuplicateOption(String),

    #[error("option '{0}' declares no values")]
    EmptyValues(String),

    #[error("no valid combinations remain after exclusion filtering")]
    NoValidCombinations,

    #[error("required input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("declaration parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("run command is empty; set run.command in the project config")]
    EmptyRunCommand,

    #[error("analyze.scan_last_lines must be at least 1")]
    InvalidScanWindow,

    #[error("convergence tolerance must be non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("convergence option '{0}' is not a declared sweep option")]
    UnknownConvergenceOption(String),
}

/// Per-combination analysis failures. These never abort the sweep.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("metric '{label}' not found in the last {window} lines of output")]
    MetricNotFound { label: String, window: usize },

    #[error("malformed numeric token '{token}' after label '{label}'")]
    MalformedNumber { label: String, token: String },

    #[error("length mismatch: {independent} independent values vs {errors} errors")]
    LengthMismatch { independent: usize, errors: usize },

    #[error("no numeric token found in output")]
    NoNumericToken,

    #[error("error {value:e} exceeds allowed maximum {max:e}")]
    ErrorAboveBound { value: f64, max: f64 },

    #[error("observed order {observed:.3} below expected {expected:.3} (tolerance {tolerance:.3})")]
    OrderBelowThreshold {
        observed: f64,
        expected: f64,
        tolerance: f64,
    },
}
