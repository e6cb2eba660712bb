//! The `expand` subcommand: list the combinations without executing.

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::commands::run::{expand_declarations, load_config};
use crate::cli::output::TableFormatter;

pub async fn execute(json: bool, config_path: Option<PathBuf>) -> Result<i32> {
    let config = load_config(config_path)?;
    let expansion = expand_declarations(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&expansion)?);
    } else {
        println!(
            "{}",
            TableFormatter::new().format_combinations(&expansion.combinations)
        );
        println!("{} combination(s)", expansion.combinations.len());
    }
    Ok(0)
}
