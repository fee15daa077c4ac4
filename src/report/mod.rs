//! # Plan Checks
//!
//! [`check_workflow`] runs every validation a workflow would run before
//! planning, but keeps going after a failure so one pass reports all of
//! them:
//!
//! 1. **Options**: enumerated limits on counts, mounts and volumes
//! 2. **Transfer table**: the table parses under the workflow's layout
//! 3. **Volumes**: every record of every pass, collecting all bad volumes
//!    and warning on volumes below a tool's accurate minimum
//! 4. **Deck**: records point at labware the workflow loads
//! 5. **Dry run**: the plan runs into a [`CommandLog`], catching tip
//!    handling mistakes; its counters end up in [`PlanReport::stats`]
//!
//! ```rust,no_run
//! use liquidplan::config::Config;
//! use liquidplan::report::check_workflow;
//! use std::path::Path;
//!
//! let config = Config::from_file(Path::new("cleanup.toml"))?;
//! let report = check_workflow(&config.workflow()?);
//! println!("{}", report);
//! # Ok::<(), liquidplan::PlanError>(())
//! ```

mod checks;

#[cfg(test)]
mod tests;

pub use checks::{CheckStatus, PlanCheck, PlanReport, Verdict};

use log::debug;

use crate::config::WorkflowConfig;
use crate::driver::CommandLog;
use crate::protocols::{VolumeRule, Workflow};
use crate::table::TransferTable;

/// Bad volumes listed per pass before the rest are summarized.
const MAX_LISTED: usize = 5;

/// Run all plan checks for `workflow`.
pub fn check_workflow(workflow: &WorkflowConfig) -> PlanReport {
    let workflow = workflow.as_workflow();
    let mut report = PlanReport::new(workflow.name());

    report.add_check(match workflow.validate_options() {
        Ok(()) => PlanCheck::ok("Workflow options"),
        Err(e) => PlanCheck::failed("Workflow options", e.to_string()),
    });

    let table = match workflow.transfer_table() {
        Ok(Some(table)) => {
            report.add_check(PlanCheck::ok(format!("Transfer table ({} records)", table.len())));
            Some(table)
        }
        Ok(None) => None,
        Err(e) => {
            report.add_check(PlanCheck::failed("Transfer table", e.to_string()));
            None
        }
    };

    if let Some(table) = &table {
        for rule in workflow.volume_rules() {
            report.add_check(check_volumes(&rule, table));
        }
    }

    report.add_check(match workflow.check_deck(table.as_ref()) {
        Ok(()) => PlanCheck::ok("Deck layout"),
        Err(e) => PlanCheck::failed("Deck layout", e.to_string()),
    });

    if report.has_failures() {
        debug!("Skipping dry run of {} after failed checks", workflow.name());
    } else {
        dry_run(workflow, &mut report);
    }

    report
}

/// Check every record of one pass.
fn check_volumes(rule: &VolumeRule, table: &TransferTable) -> PlanCheck {
    let name = format!("{:?} volumes", rule.pass);
    let mut failures = Vec::new();
    let mut below_minimum = Vec::new();

    for (i, record) in table.iter().enumerate() {
        let volume = (rule.volume_of)(record);
        let context = format!("record {} ({})", i + 1, record.destination);
        match rule.tools.select_tool(volume, rule.bounds, &context) {
            Ok(Some(tool)) => {
                let minimum = rule.tools.range(tool).map_or(0.0, |r| r.min_volume);
                if volume < minimum {
                    below_minimum.push(format!("{}: {} uL with the {} tool", context, volume, tool));
                }
            }
            Ok(None) => {}
            Err(e) => failures.push(e.to_string()),
        }
    }

    if !failures.is_empty() {
        PlanCheck::failed(name, summarize(&failures))
    } else if !below_minimum.is_empty() {
        PlanCheck::warning(
            name,
            format!("below the tool's accurate minimum: {}", summarize(&below_minimum)),
        )
    } else {
        PlanCheck::ok(name)
    }
}

fn summarize(items: &[String]) -> String {
    let mut text = items.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join("; ");
    if items.len() > MAX_LISTED {
        text.push_str(&format!(" (and {} more)", items.len() - MAX_LISTED));
    }
    text
}

fn dry_run(workflow: &dyn Workflow, report: &mut PlanReport) {
    let mut log = CommandLog::new();
    match workflow.plan(&mut log) {
        Ok(()) => {
            report.add_check(PlanCheck::ok("Dry run"));
            report.stats = Some(log.stats());
        }
        Err(e) => report.add_check(PlanCheck::failed(
            "Dry run",
            format!("{} (after {} commands)", e, log.len()),
        )),
    }
}
