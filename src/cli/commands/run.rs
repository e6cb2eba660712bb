//! The `run` subcommand: execute the full sweep.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::output::TableFormatter;
use crate::cli::types::RunArgs;
use crate::domain::models::HarnessConfig;
use crate::infrastructure::{config::ConfigLoader, declarations};
use crate::services::{
    expander, CheckOrchestrator, ExternalRunner, ReportAggregator, SweepOptions,
};

pub async fn execute(args: RunArgs, json: bool, config_path: Option<PathBuf>) -> Result<i32> {
    let config = load_config(config_path)?;
    let expansion = expand_declarations(&config)?;
    tracing::info!(
        combinations = expansion.combinations.len(),
        begin_at = args.begin_at,
        dry_run = args.dry_run,
        "sweep enumerated"
    );

    let opts = SweepOptions {
        begin_at: args.begin_at,
        dry_run: args.dry_run,
        single: args.single,
        skip_build: args.skip_build,
        debug_level: args.debug,
    };

    let orchestrator = CheckOrchestrator::new(&config, ExternalRunner);
    let summary = orchestrator.sweep(&expansion, &opts).await?;

    if json {
        println!("{}", ReportAggregator::to_json(&summary)?);
    } else {
        println!("{}", TableFormatter::new().format_summary(&summary));
    }

    if let Some(csv_path) = &args.csv {
        ReportAggregator::write_csv(&summary, csv_path)?;
    }

    Ok(ReportAggregator::finalize(&summary))
}

pub(crate) fn load_config(config_path: Option<PathBuf>) -> Result<HarnessConfig> {
    match config_path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

pub(crate) fn expand_declarations(config: &HarnessConfig) -> Result<expander::Expansion> {
    let path = Path::new(&config.working_dir).join(&config.declarations_file);
    let declarations = declarations::load(&path)
        .with_context(|| format!("loading option declarations from {}", path.display()))?;
    let expansion = expander::expand(&declarations, true).context("expanding combinations")?;

    if let Some(conv) = &config.analyze.convergence {
        if !declarations.iter().any(|d| d.name == conv.option) {
            return Err(crate::domain::error::ConfigError::UnknownConvergenceOption(
                conv.option.clone(),
            )
            .into());
        }
    }

    Ok(expansion)
}
