//! Harness configuration model.
//!
//! Loaded by the infrastructure config loader (defaults -> project YAML ->
//! local overrides -> environment) and validated before any execution.

use serde::{Deserialize, Serialize};

use super::series::ConvergenceMode;

/// Default number of trailing output lines scanned for a labeled metric.
pub const DEFAULT_SCAN_WINDOW: usize = 35;

/// Top-level harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Option-declaration file, relative to `working_dir`.
    pub declarations_file: String,
    /// Parameter file edited in place per combination, relative to
    /// `working_dir`. `None` disables parameter editing.
    pub parameter_file: Option<String>,
    /// Directory all commands run in and artifacts land in.
    pub working_dir: String,
    pub build: BuildConfig,
    pub run: RunConfig,
    pub analyze: AnalyzeConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            declarations_file: "combinations.ini".to_string(),
            parameter_file: Some("parameter.ini".to_string()),
            working_dir: ".".to_string(),
            build: BuildConfig::default(),
            run: RunConfig::default(),
            analyze: AnalyzeConfig::default(),
        }
    }
}

/// Build-stage commands, executed in order before each case's run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub commands: Vec<String>,
}

/// The external program under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Command line executing one case. Must be set by the project config.
    pub command: String,
    /// Flag prepended to the CLI debug level when it is passed through.
    pub debug_flag: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            debug_flag: "--debug".to_string(),
        }
    }
}

/// Output analysis: which metric to scrape and what to require of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Labeled line to scrape from the run output, e.g. `L_2`. `None`
    /// disables the analyze stage.
    pub error_label: Option<String>,
    /// Only the last N output lines are scanned for the label.
    pub scan_last_lines: usize,
    /// Largest acceptable scraped error value, if bounded.
    pub max_error: Option<f64>,
    pub convergence: Option<ConvergenceConfig>,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            error_label: None,
            scan_last_lines: DEFAULT_SCAN_WINDOW,
            max_error: None,
            convergence: None,
        }
    }
}

/// Convergence-order check across a group of cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Swept option serving as the independent variable.
    pub option: String,
    pub mode: ConvergenceMode,
    /// Expected order of convergence.
    pub expected_order: f64,
    /// Allowed shortfall below `expected_order`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    0.5
}
