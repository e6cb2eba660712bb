//! Sweepcheck CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sweepcheck::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => sweepcheck::cli::commands::run::execute(args, cli.json, cli.config).await,
        Commands::Expand => sweepcheck::cli::commands::expand::execute(cli.json, cli.config).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => sweepcheck::cli::handle_error(err, cli.json),
    }
}
