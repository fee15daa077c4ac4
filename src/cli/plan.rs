use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use liquidplan::config::Config;
use liquidplan::export::PlanExport;

use super::OutputFormat;

/// Plan a workflow file and write the commands out
pub fn run(file: PathBuf, format: OutputFormat, output: Option<PathBuf>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Workflow file does not exist: {}", file.display());
    }

    let config = Config::from_file(&file)
        .with_context(|| format!("Failed to load workflow file {}", file.display()))?;
    let workflow = config.workflow().context("Invalid workflow file")?;

    info!("Planning {} from {}", workflow.name(), file.display());
    let export = PlanExport::plan(&workflow)
        .with_context(|| format!("Failed to plan {} workflow", workflow.name()))?;
    info!("{}", export.stats);

    let rendered = match format {
        OutputFormat::Text => export.to_string(),
        OutputFormat::Json => export.to_json().context("Failed to serialize plan")?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write plan to {}", path.display()))?;
            info!("Wrote {} commands to {}", export.commands.len(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
