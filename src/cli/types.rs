//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sweepcheck")]
#[command(about = "Combinatorial regression harness for numerical simulation codes", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load the harness configuration from this file instead of the
    /// default hierarchy
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute the full build/run/analyze sweep
    Run(RunArgs),

    /// Expand and list the combinations without executing anything
    Expand,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Combination index to resume a previously enumerated sweep from
    #[arg(long, default_value = "0")]
    pub begin_at: usize,

    /// Print the would-be commands without executing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Run only the first dispatched case, then stop
    #[arg(long)]
    pub single: bool,

    /// Skip the build-stage commands
    #[arg(long)]
    pub skip_build: bool,

    /// Debug verbosity level passed through to the external programs
    #[arg(long)]
    pub debug: Option<u32>,

    /// Write the per-combination summary to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
