//! `validate` command: run input validation only.

use anyhow::Result;
use console::style;
use std::path::PathBuf;

use crate::cli::CliFailure;
use crate::domain::models::Config;
use crate::services::csv_validator::CsvValidator;

pub async fn handle_validate(config: &Config, path: PathBuf, json: bool) -> Result<()> {
    let validator = CsvValidator::new(config.limits.clone());

    // Any rejection, structural or hostile, exits with code 2 here.
    let table = validator
        .validate_path(&path)
        .map_err(|e| CliFailure::new(format!("rejected: {e}"), 2))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "rows": table.rows.len(),
                "warnings": table.warnings,
            })
        );
    } else {
        println!(
            "{} {} rows accepted",
            style("ok").green().bold(),
            table.rows.len()
        );
        for warning in &table.warnings {
            println!("  {} {warning}", style("warning:").yellow());
        }
    }
    Ok(())
}
