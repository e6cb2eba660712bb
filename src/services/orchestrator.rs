//! Sweep orchestration.
//!
//! Drives every expanded combination through build -> run -> analyze,
//! strictly sequentially and in expansion order: cases share one working
//! directory and mutate the parameter file in place, so concurrent
//! execution would race on shared state. A failure in one stage skips the
//! later stages for that combination and is recorded in the aggregate
//! counts; a single broken case never aborts the sweep.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use indexmap::IndexMap;
use std::time::Instant;

use crate::domain::error::AnalysisError;
use crate::domain::models::{
    AnalysisSeries, CaseOutcome, CaseStatus, Combination, ConvergenceConfig, HarnessConfig,
    RunSummary, Stage,
};
use crate::services::analyzer;
use crate::services::convergence;
use crate::services::expander::Expansion;
use crate::services::parameter_file;
use crate::services::runner::CommandRunner;

/// Caller-selected sweep behavior, mapped from the CLI surface.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Combination index to resume from.
    pub begin_at: usize,
    /// Print the would-be commands without executing anything.
    pub dry_run: bool,
    /// Stop after the first dispatched case.
    pub single: bool,
    /// Skip the build-stage commands.
    pub skip_build: bool,
    /// Debug verbosity passed through to the external run command.
    pub debug_level: Option<u32>,
}

/// Top-level sweep driver.
pub struct CheckOrchestrator<'a, R: CommandRunner> {
    config: &'a HarnessConfig,
    runner: R,
}

impl<'a, R: CommandRunner> CheckOrchestrator<'a, R> {
    pub fn new(config: &'a HarnessConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Execute the sweep and return its aggregate summary. Only
    /// configuration-class problems (missing parameter file) surface as
    /// errors here; per-case failures land in the summary counts.
    pub async fn sweep(&self, expansion: &Expansion, opts: &SweepOptions) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new(Utc::now());
        let working_dir = PathBuf::from(&self.config.working_dir);
        let run_command = self.run_command(opts);

        let mut groups: IndexMap<String, AnalysisSeries> = IndexMap::new();
        // Every dispatched command gets a fresh index so its std-<i>
        // artifacts never overwrite an earlier stage's.
        let mut invocation = 0usize;

        for combination in expansion.combinations.iter().skip(opts.begin_at) {
            if opts.dry_run {
                self.print_dry_run(combination, &run_command, opts);
                summary.outcomes.push(CaseOutcome {
                    index: combination.index,
                    combination: combination.label(),
                    status: CaseStatus::Pending,
                    failed_stage: None,
                    message: Some("dry run".to_string()),
                    elapsed_seconds: 0.0,
                    max_error: None,
                });
                continue;
            }

            let outcome = self
                .run_case(
                    combination,
                    &working_dir,
                    &run_command,
                    opts,
                    &mut summary,
                    &mut groups,
                    &mut invocation,
                )
                .await?;
            summary.outcomes.push(outcome);

            if opts.single {
                tracing::info!("single-case mode: stopping after the first dispatched case");
                break;
            }
        }

        self.check_convergence_groups(&groups, &mut summary);

        summary.elapsed_seconds = started.elapsed().as_secs_f64();
        Ok(summary)
    }

    /// Drive one combination to its terminal state.
    #[allow(clippy::too_many_arguments)]
    async fn run_case(
        &self,
        combination: &Combination,
        working_dir: &Path,
        run_command: &str,
        opts: &SweepOptions,
        summary: &mut RunSummary,
        groups: &mut IndexMap<String, AnalysisSeries>,
        invocation: &mut usize,
    ) -> Result<CaseOutcome> {
        let mut status = CaseStatus::Pending;
        let mut elapsed = 0.0;
        tracing::info!(case = combination.index, combination = %combination.label(), "starting case");

        if let Some(parameter_file) = &self.config.parameter_file {
            let path = working_dir.join(parameter_file);
            let edited = parameter_file::edit_file(&path, combination)
                .with_context(|| format!("editing parameter file for case {}", combination.index))?;
            tracing::debug!(case = combination.index, edited, "parameter file updated");
        }

        // Build stage.
        if !opts.skip_build {
            for command in &self.config.build.commands {
                advance(&mut status, CaseStatus::Building);
                let result = self
                    .runner
                    .run(command, working_dir, next_invocation(invocation))
                    .await;
                elapsed += result.elapsed_seconds;
                if result.failed {
                    summary.build_errors += 1;
                    tracing::error!(
                        case = combination.index,
                        command,
                        exit_code = ?result.exit_code,
                        "build failed; skipping run and analyze"
                    );
                    advance(&mut status, CaseStatus::Failed);
                    return Ok(failure(
                        combination,
                        Stage::Build,
                        format!("build command failed: {}", command),
                        elapsed,
                    ));
                }
            }
        }

        // Run stage.
        advance(&mut status, CaseStatus::Running);
        let result = self
            .runner
            .run(run_command, working_dir, next_invocation(invocation))
            .await;
        elapsed += result.elapsed_seconds;
        if result.failed {
            summary.run_errors += 1;
            tracing::error!(
                case = combination.index,
                command = run_command,
                exit_code = ?result.exit_code,
                "run failed; skipping analyze"
            );
            advance(&mut status, CaseStatus::Failed);
            return Ok(failure(
                combination,
                Stage::Run,
                format!("run command failed: {}", run_command),
                elapsed,
            ));
        }

        // Analyze stage.
        let mut max_error = None;
        if let Some(label) = &self.config.analyze.error_label {
            advance(&mut status, CaseStatus::Analyzing);
            match self.analyze_case(combination, label, &result.stdout, groups) {
                Ok(observed_max) => max_error = observed_max,
                Err(e) => {
                    summary.analyze_errors += 1;
                    tracing::error!(case = combination.index, label, error = %e, "analysis failed");
                    advance(&mut status, CaseStatus::Failed);
                    return Ok(failure(combination, Stage::Analyze, e.to_string(), elapsed));
                }
            }
        }

        advance(&mut status, CaseStatus::Passed);
        tracing::info!(case = combination.index, elapsed_seconds = elapsed, "case passed");
        Ok(CaseOutcome {
            index: combination.index,
            combination: combination.label(),
            status,
            failed_stage: None,
            message: None,
            elapsed_seconds: elapsed,
            max_error,
        })
    }

    /// Scrape the configured metric, enforce the error bound, and feed the
    /// case's convergence group.
    fn analyze_case(
        &self,
        combination: &Combination,
        label: &str,
        stdout: &str,
        groups: &mut IndexMap<String, AnalysisSeries>,
    ) -> Result<Option<f64>, AnalysisError> {
        let errors =
            analyzer::extract_labeled_numbers(stdout, label, self.config.analyze.scan_last_lines)?;
        let observed_max = errors.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if let Some(max_allowed) = self.config.analyze.max_error {
            if observed_max > max_allowed {
                return Err(AnalysisError::ErrorAboveBound {
                    value: observed_max,
                    max: max_allowed,
                });
            }
        }

        if let Some(conv) = &self.config.analyze.convergence {
            match combination.get(&conv.option).map(str::parse::<f64>) {
                Some(Ok(independent)) => {
                    let key = group_key(combination, &conv.option);
                    groups.entry(key).or_default().push(independent, errors.clone());
                }
                Some(Err(_)) => {
                    tracing::warn!(
                        case = combination.index,
                        option = conv.option.as_str(),
                        "convergence option value is not numeric; case left out of its group"
                    );
                }
                None => {
                    tracing::debug!(
                        case = combination.index,
                        option = conv.option.as_str(),
                        "combination does not assign the convergence option"
                    );
                }
            }
        }

        Ok(Some(observed_max))
    }

    /// Convergence verdicts per group, once the whole sweep has run.
    fn check_convergence_groups(
        &self,
        groups: &IndexMap<String, AnalysisSeries>,
        summary: &mut RunSummary,
    ) {
        let Some(conv) = &self.config.analyze.convergence else {
            return;
        };

        for (key, series) in groups {
            if series.len() < 2 {
                tracing::debug!(group = key.as_str(), points = series.len(), "group too short for a rate");
                continue;
            }
            let independents = series.independents();
            for variable in 0..series.variable_count() {
                let column = series.column(variable);
                let observed = match convergence::order(&independents, &column, conv.mode) {
                    Ok(orders) => convergence::mean_order(&orders),
                    Err(e) => {
                        summary.analyze_errors += 1;
                        summary
                            .group_failures
                            .push(format!("group [{}] variable {}: {}", key, variable, e));
                        continue;
                    }
                };
                if observed < conv.expected_order - conv.tolerance {
                    summary.analyze_errors += 1;
                    let failure = AnalysisError::OrderBelowThreshold {
                        observed,
                        expected: conv.expected_order,
                        tolerance: conv.tolerance,
                    };
                    tracing::error!(group = key.as_str(), variable, %failure, "convergence check failed");
                    summary
                        .group_failures
                        .push(format!("group [{}] variable {}: {}", key, variable, failure));
                } else {
                    tracing::info!(
                        group = key.as_str(),
                        variable,
                        observed_order = observed,
                        "convergence check passed"
                    );
                }
            }
        }
    }

    fn run_command(&self, opts: &SweepOptions) -> String {
        match opts.debug_level {
            Some(level) => format!(
                "{} {} {}",
                self.config.run.command, self.config.run.debug_flag, level
            ),
            None => self.config.run.command.clone(),
        }
    }

    fn print_dry_run(&self, combination: &Combination, run_command: &str, opts: &SweepOptions) {
        println!("[{}] {}", combination.index, combination.label());
        if !opts.skip_build {
            for command in &self.config.build.commands {
                println!("    build: {}", command);
            }
        }
        println!("    run:   {}", run_command);
    }
}

/// All assignment pairs except the independent variable; cases sharing a
/// key vary only the convergence option and belong to one series.
fn group_key(combination: &Combination, independent_option: &str) -> String {
    combination
        .assignment
        .iter()
        .filter(|(name, _)| name.as_str() != independent_option)
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",")
}

fn next_invocation(counter: &mut usize) -> usize {
    let current = *counter;
    *counter += 1;
    current
}

fn advance(status: &mut CaseStatus, next: CaseStatus) {
    debug_assert!(
        status.can_transition_to(next) || *status == next,
        "invalid case transition {:?} -> {:?}",
        status,
        next
    );
    tracing::trace!(from = status.as_str(), to = next.as_str(), "case transition");
    *status = next;
}

fn failure(
    combination: &Combination,
    stage: Stage,
    message: String,
    elapsed_seconds: f64,
) -> CaseOutcome {
    CaseOutcome {
        index: combination.index,
        combination: combination.label(),
        status: CaseStatus::Failed,
        failed_stage: Some(stage),
        message: Some(message),
        elapsed_seconds,
        max_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ConvergenceMode, ExecutionResult, OptionDeclaration};
    use crate::services::expander;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted runner: fails the listed invocation indices, otherwise
    /// succeeds and prints one labeled error line whose magnitude shrinks
    /// by 16x per invocation.
    struct ScriptedRunner {
        fail_invocations: Vec<usize>,
        dispatched: Mutex<Vec<String>>,
        invocations: Mutex<Vec<usize>>,
    }

    impl ScriptedRunner {
        fn new(fail_invocations: Vec<usize>) -> Self {
            Self {
                fail_invocations,
                dispatched: Mutex::new(Vec::new()),
                invocations: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, command: &str, working_dir: &Path, invocation: usize) -> ExecutionResult {
            self.dispatched.lock().unwrap().push(command.to_string());
            self.invocations.lock().unwrap().push(invocation);
            if self.fail_invocations.contains(&invocation) {
                return ExecutionResult {
                    command: command.to_string(),
                    working_dir: working_dir.to_path_buf(),
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: "boom".to_string(),
                    stdout_path: None,
                    stderr_path: None,
                    elapsed_seconds: 0.01,
                    failed: true,
                };
            }
            ExecutionResult {
                command: command.to_string(),
                working_dir: working_dir.to_path_buf(),
                exit_code: Some(0),
                stdout: format!("steps : 10\nL_2 : {:e}\n", 1e-2 / 16f64.powi(invocation as i32)),
                stderr: String::new(),
                stdout_path: None,
                stderr_path: None,
                elapsed_seconds: 0.01,
                failed: false,
            }
        }
    }

    fn config_without_parameter_file() -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.parameter_file = None;
        config.run.command = "./solver".to_string();
        config.analyze.error_label = Some("L_2".to_string());
        config
    }

    fn expansion_n(values: &[&str]) -> Expansion {
        let declarations = vec![OptionDeclaration::new(
            "N",
            values.iter().map(|v| v.to_string()).collect(),
        )];
        expander::expand(&declarations, true).unwrap()
    }

    #[tokio::test]
    async fn failed_run_is_counted_and_sweep_continues() {
        let config = config_without_parameter_file();
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![1]));
        let expansion = expansion_n(&["1", "2", "4"]);

        let summary = orchestrator
            .sweep(&expansion, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.run_errors, 1);
        assert_eq!(summary.build_errors, 0);
        assert_eq!(summary.total_errors(), 1);
        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.outcomes[0].status, CaseStatus::Passed);
        assert_eq!(summary.outcomes[1].status, CaseStatus::Failed);
        assert_eq!(summary.outcomes[1].failed_stage, Some(Stage::Run));
        assert_eq!(summary.outcomes[2].status, CaseStatus::Passed);
    }

    #[tokio::test]
    async fn build_failure_skips_run_and_analyze() {
        let mut config = config_without_parameter_file();
        config.build.commands = vec!["make".to_string()];
        // Every invocation index fails, so the build of case 0 fails and
        // its run command must never be dispatched.
        let runner = ScriptedRunner::new(vec![0, 1, 2]);
        let orchestrator = CheckOrchestrator::new(&config, runner);
        let expansion = expansion_n(&["1"]);

        let summary = orchestrator
            .sweep(&expansion, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.build_errors, 1);
        assert_eq!(summary.run_errors, 0);
        assert_eq!(summary.outcomes[0].failed_stage, Some(Stage::Build));
        let dispatched = orchestrator.runner.dispatched.lock().unwrap();
        assert_eq!(dispatched.as_slice(), &["make".to_string()]);
    }

    #[tokio::test]
    async fn every_dispatch_gets_a_fresh_invocation_index() {
        let mut config = config_without_parameter_file();
        config.build.commands = vec!["make".to_string()];
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1", "2"]);

        orchestrator
            .sweep(&expansion, &SweepOptions::default())
            .await
            .unwrap();

        // Build and run of a case must not share an index, or the run's
        // std-<i> artifacts would overwrite the build's.
        let invocations = orchestrator.runner.invocations.lock().unwrap();
        assert_eq!(invocations.as_slice(), &[0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn single_mode_stops_after_first_case() {
        let config = config_without_parameter_file();
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1", "2", "4"]);

        let opts = SweepOptions {
            single: true,
            ..Default::default()
        };
        let summary = orchestrator.sweep(&expansion, &opts).await.unwrap();
        assert_eq!(summary.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn begin_at_resumes_partway() {
        let config = config_without_parameter_file();
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1", "2", "4"]);

        let opts = SweepOptions {
            begin_at: 2,
            ..Default::default()
        };
        let summary = orchestrator.sweep(&expansion, &opts).await.unwrap();
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.outcomes[0].index, 2);
    }

    #[tokio::test]
    async fn dry_run_dispatches_nothing() {
        let config = config_without_parameter_file();
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1", "2"]);

        let opts = SweepOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = orchestrator.sweep(&expansion, &opts).await.unwrap();
        assert_eq!(summary.total_errors(), 0);
        assert_eq!(summary.outcomes.len(), 2);
        assert!(summary
            .outcomes
            .iter()
            .all(|o| o.status == CaseStatus::Pending));
        assert!(orchestrator.runner.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_metric_is_an_analyze_error() {
        let mut config = config_without_parameter_file();
        config.analyze.error_label = Some("L_inf".to_string());
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1"]);

        let summary = orchestrator
            .sweep(&expansion, &SweepOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.analyze_errors, 1);
        assert_eq!(summary.outcomes[0].failed_stage, Some(Stage::Analyze));
        assert!(summary.outcomes[0]
            .message
            .as_deref()
            .unwrap()
            .contains("L_inf"));
    }

    #[tokio::test]
    async fn convergence_group_failure_is_counted() {
        let mut config = config_without_parameter_file();
        // The scripted errors shrink 16x per halving of h, i.e. fourth
        // order; demanding order 10 must fail the group check.
        config.analyze.convergence = Some(ConvergenceConfig {
            option: "N".to_string(),
            mode: ConvergenceMode::GridSpacing,
            expected_order: 10.0,
            tolerance: 0.5,
        });
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["0.4", "0.2", "0.1"]);

        let summary = orchestrator
            .sweep(&expansion, &SweepOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.analyze_errors, 1);
        assert_eq!(summary.group_failures.len(), 1);
        assert!(summary.group_failures[0].contains("below expected"));
    }

    #[tokio::test]
    async fn debug_level_is_appended_to_the_run_command() {
        let config = config_without_parameter_file();
        let orchestrator = CheckOrchestrator::new(&config, ScriptedRunner::new(vec![]));
        let expansion = expansion_n(&["1"]);

        let opts = SweepOptions {
            debug_level: Some(3),
            ..Default::default()
        };
        orchestrator.sweep(&expansion, &opts).await.unwrap();
        let dispatched = orchestrator.runner.dispatched.lock().unwrap();
        assert_eq!(dispatched.as_slice(), &["./solver --debug 3".to_string()]);
    }
}
