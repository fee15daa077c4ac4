//! # Workflows
//!
//! Each workflow turns its config section into commands for a [`Driver`].
//! All of them follow the same shape:
//!
//! 1. validate options, parse the transfer table, check every volume and
//!    every deck reference;
//! 2. only then turn the rail lights on, load labware by iterating plate
//!    descriptors, and run the transfer passes;
//! 3. turn the lights off.
//!
//! A plan that fails step 1 issues nothing.
//!
//! ```rust,no_run
//! use liquidplan::config::Config;
//! use liquidplan::driver::CommandLog;
//! use liquidplan::protocols::plan_workflow;
//! use std::path::Path;
//!
//! let config = Config::from_file(Path::new("standardize.toml"))?;
//! let mut log = CommandLog::new();
//! plan_workflow(&config.workflow()?, &mut log)?;
//! println!("{}", log.stats());
//! # Ok::<(), liquidplan::PlanError>(())
//! ```

mod cleanup;
mod distribute;
mod ligation;
mod pool;
mod standardize;


use log::info;
use std::collections::HashSet;

use crate::config::WorkflowConfig;
use crate::driver::{Command, Driver};
use crate::error::{PlanError, Result};
use crate::labware::{PlateDescriptor, Slot, WellName};
use crate::planner::{validate_records, PlannedTransfer, ToolSet, TransferPass, VolumeBounds};
use crate::table::{TransferRecord, TransferTable};

/// Volume rule for one transfer pass over a table.
#[derive(Debug, Clone, Copy)]
pub struct VolumeRule {
    /// Pass the rule applies to.
    pub pass: TransferPass,
    /// Tools mounted for the pass.
    pub tools: ToolSet,
    /// Accepted volumes.
    pub bounds: VolumeBounds,
    /// Volume a record contributes to the pass.
    pub volume_of: fn(&TransferRecord) -> f64,
}

impl VolumeRule {
    /// Select a tool for every record, failing on the first bad volume.
    pub fn apply<'a>(&self, records: &'a [TransferRecord]) -> Result<Vec<PlannedTransfer<'a>>> {
        validate_records(records, &self.tools, self.bounds, self.pass, self.volume_of)
    }
}

/// A configured workflow.
pub trait Workflow {
    /// Section name.
    fn name(&self) -> &'static str;

    /// Check the enumerated options.
    fn validate_options(&self) -> Result<()>;

    /// Parse the transfer table, for workflows that take one.
    fn transfer_table(&self) -> Result<Option<TransferTable>>;

    /// Volume rules applied to the transfer table.
    fn volume_rules(&self) -> Vec<VolumeRule>;

    /// Check that every record refers to labware the workflow loads.
    fn check_deck(&self, table: Option<&TransferTable>) -> Result<()>;

    /// Validate everything, then issue the full command sequence.
    fn plan(&self, driver: &mut dyn Driver) -> Result<()>;
}

impl WorkflowConfig {
    /// The configured workflow behind the [`Workflow`] interface.
    pub fn as_workflow(&self) -> &dyn Workflow {
        match self {
            WorkflowConfig::Standardize(c) => c,
            WorkflowConfig::Pool(c) => c,
            WorkflowConfig::Distribute(c) => c,
            WorkflowConfig::Ligation(c) => c,
            WorkflowConfig::Cleanup(c) => c,
        }
    }
}

/// Plan `workflow` into `driver`.
pub fn plan_workflow<D: Driver>(workflow: &WorkflowConfig, driver: &mut D) -> Result<()> {
    let workflow = workflow.as_workflow();
    info!("Planning {} workflow", workflow.name());
    workflow.plan(driver)
}

/// Run every validation of `workflow` without issuing a command.
pub fn validate_workflow(workflow: &dyn Workflow) -> Result<()> {
    workflow.validate_options()?;
    let table = workflow.transfer_table()?;
    if let Some(table) = &table {
        for rule in workflow.volume_rules() {
            rule.apply(table.records())?;
        }
    }
    workflow.check_deck(table.as_ref())
}

pub(crate) fn deck_slot(number: u8) -> Result<Slot> {
    Slot::new(number).ok_or_else(|| PlanError::config(format!("slot {} is not on the deck", number)))
}

pub(crate) fn reservoir_well(column: usize) -> Result<WellName> {
    WellName::column_head(column)
        .ok_or_else(|| PlanError::config(format!("reservoir has no column {}", column + 1)))
}

pub(crate) fn rail_lights(driver: &mut dyn Driver, on: bool) -> Result<()> {
    driver.execute(Command::SetRailLights { on })?;
    Ok(())
}

pub(crate) fn load_labware(driver: &mut dyn Driver, load_name: &str, slot: Slot, label: Option<&str>) -> Result<()> {
    driver.execute(Command::LoadLabware {
        load_name: load_name.to_string(),
        slot,
        label: label.map(str::to_string),
    })?;
    Ok(())
}

pub(crate) fn load_tip_racks(driver: &mut dyn Driver, load_name: &str, slots: &[Slot]) -> Result<()> {
    for slot in slots {
        load_labware(driver, load_name, *slot, None)?;
    }
    Ok(())
}

pub(crate) fn load_plates(driver: &mut dyn Driver, plates: &[PlateDescriptor]) -> Result<()> {
    for plate in plates {
        load_labware(driver, plate.plate_type.load_name(), plate.slot, Some(&plate.label))?;
    }
    Ok(())
}

pub(crate) fn slots_from(first: u8, count: usize) -> Result<Vec<Slot>> {
    (0..count)
        .map(|i| {
            let number = u8::try_from(i)
                .ok()
                .and_then(|i| first.checked_add(i))
                .ok_or_else(|| PlanError::config(format!("too many slots requested from {}", first)))?;
            deck_slot(number)
        })
        .collect()
}

pub(crate) fn slots_of(plates: &[PlateDescriptor]) -> Vec<Slot> {
    plates.iter().map(|p| p.slot).collect()
}

/// Fail unless every record's source and destination sit on loaded
/// labware. `sources` of `None` skips the source check.
pub(crate) fn check_record_slots(
    records: &[TransferRecord],
    sources: Option<&[Slot]>,
    destinations: &[Slot],
) -> Result<()> {
    let dest_slots: HashSet<Slot> = destinations.iter().copied().collect();
    let source_slots: Option<HashSet<Slot>> = sources.map(|s| s.iter().copied().collect());

    for (i, record) in records.iter().enumerate() {
        if let Some(source_slots) = &source_slots {
            if !source_slots.contains(&record.source.slot) {
                return Err(PlanError::config(format!(
                    "record {}: source slot {} does not hold a loaded source plate",
                    i + 1,
                    record.source.slot
                )));
            }
        }
        if !dest_slots.contains(&record.destination.slot) {
            return Err(PlanError::config(format!(
                "record {}: destination slot {} does not hold a loaded destination plate",
                i + 1,
                record.destination.slot
            )));
        }
    }
    Ok(())
}

/// Wells of each plate that receive a sample-wise addition: the first
/// `samples[i]` wells in row order, minus that plate's skip list.
pub(crate) fn sample_wells<'a>(
    plates: &'a [PlateDescriptor],
    samples: &'a [usize],
    skip_for: impl Fn(usize) -> &'a [WellName] + 'a,
) -> impl Iterator<Item = (&'a PlateDescriptor, WellName)> + 'a {
    plates.iter().zip(samples).enumerate().flat_map(move |(i, (plate, count))| {
        let skip = skip_for(i);
        WellName::first_n(*count)
            .filter(move |well| !skip.contains(well))
            .map(move |well| (plate, well))
    })
}
