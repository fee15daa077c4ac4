//! # Workflow Configuration
//!
//! Every workflow is described by a typed config section in a TOML file:
//!
//! ```toml
//! [standardize]
//! large_mount = "left"
//! small_mount = "right"
//! source_plates = 3
//! destination_plates = 2
//! source_plate_type = "nest_100ul"
//! destination_status = "used"
//! extra_rack = "none"
//! table_file = "standardize.csv"
//! ```
//!
//! A file holds exactly one workflow section. Transfer tables are given
//! inline with `table = """..."""` or by path with `table_file`, which is
//! resolved relative to the TOML file.
//!
//! Sections deserialize with defaults for every option and reject keys they
//! do not know; [`validate`] methods check the enumerated limits before
//! anything is planned.
//!
//! [`validate`]: StandardizeConfig::validate

mod cleanup;
mod distribute;
mod ligation;
mod pool;
mod standardize;


pub use cleanup::{BindingReagent, CleanupConfig};
pub use distribute::DistributeConfig;
pub use ligation::LigationConfig;
pub use pool::PoolConfig;
pub use standardize::StandardizeConfig;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PlanError, Result};
use crate::labware::{Mount, WellName};
use crate::table::{TableLayout, TransferTable};

/// Root of a workflow file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// DNA standardization.
    pub standardize: Option<StandardizeConfig>,
    /// Pooling into tubes.
    pub pool: Option<PoolConfig>,
    /// Master-mix distribution.
    pub distribute: Option<DistributeConfig>,
    /// Ligation prep.
    pub ligation: Option<LigationConfig>,
    /// Bead cleanup.
    pub cleanup: Option<CleanupConfig>,
}

/// The single workflow a file describes.
#[derive(Debug, Clone)]
pub enum WorkflowConfig {
    /// DNA standardization.
    Standardize(StandardizeConfig),
    /// Pooling into tubes.
    Pool(PoolConfig),
    /// Master-mix distribution.
    Distribute(DistributeConfig),
    /// Ligation prep.
    Ligation(LigationConfig),
    /// Bead cleanup.
    Cleanup(CleanupConfig),
}

impl WorkflowConfig {
    /// Section name of the workflow.
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowConfig::Standardize(_) => "standardize",
            WorkflowConfig::Pool(_) => "pool",
            WorkflowConfig::Distribute(_) => "distribute",
            WorkflowConfig::Ligation(_) => "ligation",
            WorkflowConfig::Cleanup(_) => "cleanup",
        }
    }
}

impl Config {
    /// Load a workflow file, reading any `table_file` relative to it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_tables(base)?;
        Ok(config)
    }

    /// Parse a workflow file from a string. `table_file` entries are left
    /// unresolved.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read every `table_file` relative to `base` into its inline table.
    pub fn resolve_tables(&mut self, base: &Path) -> Result<()> {
        if let Some(c) = self.standardize.as_mut() {
            resolve_table(&mut c.table, &mut c.table_file, base)?;
        }
        if let Some(c) = self.pool.as_mut() {
            resolve_table(&mut c.table, &mut c.table_file, base)?;
        }
        if let Some(c) = self.ligation.as_mut() {
            resolve_table(&mut c.table, &mut c.table_file, base)?;
        }
        Ok(())
    }

    /// The one workflow this file configures.
    pub fn workflow(&self) -> Result<WorkflowConfig> {
        let mut found: Vec<WorkflowConfig> = Vec::new();
        if let Some(c) = &self.standardize {
            found.push(WorkflowConfig::Standardize(c.clone()));
        }
        if let Some(c) = &self.pool {
            found.push(WorkflowConfig::Pool(c.clone()));
        }
        if let Some(c) = &self.distribute {
            found.push(WorkflowConfig::Distribute(c.clone()));
        }
        if let Some(c) = &self.ligation {
            found.push(WorkflowConfig::Ligation(c.clone()));
        }
        if let Some(c) = &self.cleanup {
            found.push(WorkflowConfig::Cleanup(c.clone()));
        }

        match found.len() {
            0 => Err(PlanError::config(
                "no workflow section found. Expected one of [standardize], [pool], [distribute], [ligation], [cleanup]",
            )),
            1 => Ok(found.remove(0)),
            _ => {
                let names: Vec<&str> = found.iter().map(WorkflowConfig::name).collect();
                Err(PlanError::config(format!(
                    "a workflow file holds one workflow, found {}",
                    names.join(", ")
                )))
            }
        }
    }
}

/// Read `table_file` into `table`. A section gives one or the other.
pub(crate) fn resolve_table(table: &mut Option<String>, table_file: &mut Option<PathBuf>, base: &Path) -> Result<()> {
    if table.is_some() {
        if table_file.is_some() {
            return Err(PlanError::config("give either 'table' or 'table_file', not both"));
        }
        return Ok(());
    }
    if let Some(file) = table_file.take() {
        let path = if file.is_absolute() { file } else { base.join(file) };
        debug!("Reading transfer table from {}", path.display());
        *table = Some(std::fs::read_to_string(&path)?);
    }
    Ok(())
}

/// Parse a section's inline table with `layout`.
pub(crate) fn parse_table(table: Option<&str>, table_file: Option<&Path>, layout: TableLayout) -> Result<TransferTable> {
    match (table, table_file) {
        (Some(text), _) => TransferTable::parse(text, layout),
        (None, Some(file)) => Err(PlanError::config(format!(
            "table file '{}' was not loaded; load the config with Config::from_file",
            file.display()
        ))),
        (None, None) => Err(PlanError::config("missing transfer table ('table' or 'table_file')")),
    }
}

pub(crate) fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(PlanError::config(format!(
            "invalid {} {}. Must be {}-{}",
            name, value, min, max
        )));
    }
    Ok(())
}

pub(crate) fn check_distinct_mounts(large: Mount, small: Mount) -> Result<()> {
    if large == small {
        return Err(PlanError::config(format!(
            "invalid pipette placement: both pipettes on the {} mount",
            large
        )));
    }
    Ok(())
}

/// Per-plate sample counts and skip lists shared by the distribution
/// workflows.
pub(crate) fn check_plate_samples(plates: usize, samples: &[usize], skip: &[Vec<WellName>]) -> Result<()> {
    if samples.len() != plates {
        return Err(PlanError::config(format!(
            "the number of sample plates ({}) does not match the number of sample counts ({})",
            plates,
            samples.len()
        )));
    }
    for (i, count) in samples.iter().enumerate() {
        check_range(&format!("sample count for plate {}", i + 1), *count, 1, 96)?;
    }
    if skip.len() > plates {
        return Err(PlanError::config(format!(
            "skip lists given for {} plates but only {} are loaded",
            skip.len(),
            plates
        )));
    }
    for (i, wells) in skip.iter().enumerate() {
        let mut seen = HashSet::new();
        if let Some(dup) = wells.iter().find(|w| !seen.insert(**w)) {
            return Err(PlanError::config(format!(
                "well {} listed twice in the skip list for plate {}",
                dup,
                i + 1
            )));
        }
    }
    Ok(())
}

fn default_left() -> Mount {
    Mount::Left
}

fn default_right() -> Mount {
    Mount::Right
}

fn default_one() -> usize {
    1
}
