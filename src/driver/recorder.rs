use std::collections::HashMap;

use super::{Command, Driver, DriverError, PlanStats};
use crate::labware::Mount;

/// A driver that records every command instead of moving hardware.
///
/// It keeps just enough state to catch tip-handling mistakes: one loaded
/// instrument per mount and whether that instrument currently holds a tip.
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: Vec<Command>,
    /// Tip attached, keyed by mounts with a loaded instrument.
    tips: HashMap<Mount, bool>,
}

impl CommandLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in issue order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consume the log and return the commands.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether the pipette on `mount` currently holds a tip.
    pub fn has_tip(&self, mount: Mount) -> bool {
        self.tips.get(&mount).copied().unwrap_or(false)
    }

    /// Summary counters over the recorded commands.
    pub fn stats(&self) -> PlanStats {
        PlanStats::from_commands(&self.commands)
    }

    fn tip_state(&mut self, mount: Mount) -> Result<&mut bool, DriverError> {
        self.tips.get_mut(&mount).ok_or(DriverError::NoInstrument(mount))
    }
}

impl Driver for CommandLog {
    fn execute(&mut self, command: Command) -> Result<(), DriverError> {
        match &command {
            Command::LoadInstrument { mount, .. } => {
                if self.tips.contains_key(mount) {
                    return Err(DriverError::Rejected(format!(
                        "{} mount already has an instrument",
                        mount
                    )));
                }
                self.tips.insert(*mount, false);
            }
            Command::PickUpTip { mount, .. } => {
                let mount = *mount;
                let attached = self.tip_state(mount)?;
                if *attached {
                    return Err(DriverError::TipAlreadyAttached(mount));
                }
                *attached = true;
            }
            Command::DropTip { mount } | Command::ReturnTip { mount } => {
                let mount = *mount;
                let attached = self.tip_state(mount)?;
                if !*attached {
                    return Err(DriverError::NoTipAttached(mount));
                }
                *attached = false;
            }
            Command::Aspirate { mount, .. }
            | Command::Dispense { mount, .. }
            | Command::Mix { mount, .. }
            | Command::AirGap { mount, .. } => {
                let mount = *mount;
                if !*self.tip_state(mount)? {
                    return Err(DriverError::NoTipAttached(mount));
                }
            }
            other => {
                if let Some(mount) = other.mount() {
                    self.tip_state(mount)?;
                }
            }
        }

        self.commands.push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Target;
    use crate::labware::{Location, Slot, WellName};

    fn load(log: &mut CommandLog, mount: Mount) {
        log.execute(Command::LoadInstrument {
            instrument: "p20_single_gen2".to_string(),
            mount,
            tip_racks: vec![Slot::new(8).unwrap()],
        })
        .unwrap();
    }

    fn target() -> Target {
        Target::well(Location::new(Slot::new(5).unwrap(), "A1".parse::<WellName>().unwrap()))
    }

    #[test]
    fn test_records_in_order() {
        let mut log = CommandLog::new();
        log.execute(Command::SetRailLights { on: true }).unwrap();
        load(&mut log, Mount::Right);
        log.execute(Command::PickUpTip {
            mount: Mount::Right,
            tip: None,
        })
        .unwrap();
        assert!(log.has_tip(Mount::Right));
        log.execute(Command::DropTip { mount: Mount::Right }).unwrap();
        assert!(!log.has_tip(Mount::Right));

        assert_eq!(log.len(), 4);
        assert_eq!(log.commands()[0], Command::SetRailLights { on: true });
    }

    #[test]
    fn test_rejects_double_pick_up() {
        let mut log = CommandLog::new();
        load(&mut log, Mount::Left);
        let pick = Command::PickUpTip {
            mount: Mount::Left,
            tip: None,
        };
        log.execute(pick.clone()).unwrap();
        assert_eq!(
            log.execute(pick),
            Err(DriverError::TipAlreadyAttached(Mount::Left))
        );
    }

    #[test]
    fn test_rejects_liquid_handling_without_tip() {
        let mut log = CommandLog::new();
        load(&mut log, Mount::Left);
        let err = log
            .execute(Command::Aspirate {
                mount: Mount::Left,
                volume: 5.0,
                target: target(),
            })
            .unwrap_err();
        assert_eq!(err, DriverError::NoTipAttached(Mount::Left));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_rejects_unknown_mount() {
        let mut log = CommandLog::new();
        let err = log.execute(Command::TouchTip { mount: Mount::Right }).unwrap_err();
        assert_eq!(err, DriverError::NoInstrument(Mount::Right));
    }
}
