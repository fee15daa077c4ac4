//! Planned command sequences in a form that can be saved or read by a person.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::config::WorkflowConfig;
use crate::driver::{Command, CommandLog, PlanStats};
use crate::error::Result;
use crate::protocols::plan_workflow;

/// A planned workflow with its commands and counters.
#[derive(Debug, Clone, Serialize)]
pub struct PlanExport {
    /// Workflow section name.
    pub workflow: String,
    /// When the plan was made.
    pub generated_at: DateTime<Utc>,
    /// Counters over `commands`.
    pub stats: PlanStats,
    /// Commands in issue order.
    pub commands: Vec<Command>,
}

impl PlanExport {
    /// Plan `workflow` into a fresh [`CommandLog`].
    pub fn plan(workflow: &WorkflowConfig) -> Result<Self> {
        let mut log = CommandLog::new();
        plan_workflow(workflow, &mut log)?;
        Ok(Self::from_log(workflow.name(), log))
    }

    /// Wrap an already recorded plan.
    pub fn from_log(workflow: impl Into<String>, log: CommandLog) -> Self {
        let stats = log.stats();
        Self {
            workflow: workflow.into(),
            generated_at: Utc::now(),
            stats,
            commands: log.into_commands(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for PlanExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {} plan, generated {}",
            self.workflow,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        let width = self.commands.len().to_string().len();
        for (i, command) in self.commands.iter().enumerate() {
            writeln!(f, "{:>width$}  {}", i + 1, command, width = width)?;
        }
        writeln!(f, "# {}", self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn distribute() -> WorkflowConfig {
        Config::from_str(
            r#"
            [distribute]
            samples = [2]
            master_mix_volume = 5
            "#,
        )
        .unwrap()
        .workflow()
        .unwrap()
    }

    #[test]
    fn test_text_listing() {
        let export = PlanExport::plan(&distribute()).unwrap();
        let text = export.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("# distribute plan, generated "));
        assert_eq!(lines.len(), export.commands.len() + 2);
        assert!(lines[1].trim_start().starts_with("1  rail lights on"));
        assert!(lines.last().unwrap().starts_with("# Planned"));
    }

    #[test]
    fn test_json_is_tagged() {
        let export = PlanExport::plan(&distribute()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();

        assert_eq!(value["workflow"], "distribute");
        assert_eq!(value["commands"][0]["command"], "set_rail_lights");
        assert_eq!(value["stats"]["tip_pickups"], 2);
    }
}
