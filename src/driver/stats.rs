use serde::Serialize;
use std::fmt;

use super::Command;

/// Counters over a planned command sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanStats {
    /// Total number of commands
    pub commands: usize,
    /// Tips taken from racks (parked tips picked up again are included)
    pub tip_pickups: usize,
    /// Tips discarded in the trash
    pub tips_dropped: usize,
    /// Tips put back in their rack for later reuse
    pub tips_returned: usize,
    /// Number of dispense steps
    pub dispenses: usize,
    /// Sum of all dispensed volumes in µL
    pub dispensed_ul: f64,
    /// Sum of all programmed waits in seconds
    pub delay_seconds: f64,
}

impl PlanStats {
    /// Tally a command sequence.
    pub fn from_commands(commands: &[Command]) -> Self {
        let mut stats = PlanStats {
            commands: commands.len(),
            ..Default::default()
        };
        for command in commands {
            match command {
                Command::PickUpTip { .. } => stats.tip_pickups += 1,
                Command::DropTip { .. } => stats.tips_dropped += 1,
                Command::ReturnTip { .. } => stats.tips_returned += 1,
                Command::Dispense { volume, .. } => {
                    stats.dispenses += 1;
                    stats.dispensed_ul += volume;
                }
                Command::Delay { seconds, .. } => stats.delay_seconds += seconds,
                _ => {}
            }
        }
        stats
    }
}

impl fmt::Display for PlanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Planned {} commands: {} dispenses ({:.2} uL), {} tip pick-ups, {:.0}s of waits",
            self.commands, self.dispenses, self.dispensed_ul, self.tip_pickups, self.delay_seconds
        )
    }
}
