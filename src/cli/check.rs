use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use liquidplan::config::Config;
use liquidplan::report::check_workflow;

/// Check a workflow file without planning it
pub fn run(file: PathBuf) -> Result<()> {
    info!("Checking {}", file.display());

    let config = Config::from_file(&file)
        .with_context(|| format!("Failed to load workflow file {}", file.display()))?;
    let workflow = config.workflow().context("Invalid workflow file")?;
    let report = check_workflow(&workflow);

    print!("{}", report.format_colored());

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
