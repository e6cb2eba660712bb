//! CLI layer: argument definitions, command execution, and output
//! rendering.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands, RunArgs};

/// Report a fatal error and exit with code 1. Configuration-class
/// problems end up here; per-case failures never do.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let payload = serde_json::json!({ "error": format!("{:#}", err) });
        eprintln!("{}", payload);
    } else {
        eprintln!("error: {:#}", err);
    }
    std::process::exit(1);
}
