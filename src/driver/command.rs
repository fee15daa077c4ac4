use serde::{Deserialize, Serialize};
use std::fmt;

use crate::labware::{Location, Mount, Slot};

/// Height reference inside a well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "at", content = "offset_mm", rename_all = "snake_case")]
pub enum WellPosition {
    /// Instrument default height.
    Default,
    /// Offset in mm above the well bottom.
    Bottom(f64),
    /// Offset in mm relative to the well top (negative is inside the well).
    Top(f64),
}

/// A position the pipette can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Well being addressed.
    pub location: Location,
    /// Height inside the well.
    pub position: WellPosition,
}

impl Target {
    /// Default height in a well.
    pub fn well(location: Location) -> Self {
        Self {
            location,
            position: WellPosition::Default,
        }
    }

    /// `offset` mm above the well bottom.
    pub fn bottom(location: Location, offset: f64) -> Self {
        Self {
            location,
            position: WellPosition::Bottom(offset),
        }
    }

    /// `offset` mm relative to the well top.
    pub fn top(location: Location, offset: f64) -> Self {
        Self {
            location,
            position: WellPosition::Top(offset),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            WellPosition::Default => write!(f, "{}", self.location),
            WellPosition::Bottom(o) => write!(f, "{} (bottom {:+}mm)", self.location, o),
            WellPosition::Top(o) => write!(f, "{} (top {:+}mm)", self.location, o),
        }
    }
}

/// A single instruction for the hardware driver.
///
/// A plan is nothing more than the ordered list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Place labware on a slot (or on the module occupying it).
    LoadLabware {
        /// Labware definition name.
        load_name: String,
        /// Deck slot.
        slot: Slot,
        /// Optional display label.
        label: Option<String>,
    },
    /// Place a hardware module on a slot.
    LoadModule {
        /// Module model name.
        module: String,
        /// Deck slot.
        slot: Slot,
    },
    /// Attach a pipette to a mount with its tip racks.
    LoadInstrument {
        /// Instrument model name.
        instrument: String,
        /// Mount.
        mount: Mount,
        /// Slots of the tip racks it draws from.
        tip_racks: Vec<Slot>,
    },
    /// Set plunger flow rates in µL/s.
    SetFlowRate {
        /// Pipette.
        mount: Mount,
        /// Aspirate rate.
        aspirate: f64,
        /// Dispense rate.
        dispense: f64,
    },
    /// Cap vertical gantry speed; `None` restores the default.
    SetZSpeed {
        /// Speed limit in mm/s.
        mm_per_sec: Option<f64>,
    },
    /// Pick up the next tip, or the tip at `tip` when returning to a parked one.
    PickUpTip {
        /// Pipette.
        mount: Mount,
        /// Specific rack position to pick from.
        tip: Option<Location>,
    },
    /// Discard the current tip in the trash.
    DropTip {
        /// Pipette.
        mount: Mount,
    },
    /// Put the current tip back where it was picked up.
    ReturnTip {
        /// Pipette.
        mount: Mount,
    },
    /// Draw liquid.
    Aspirate {
        /// Pipette.
        mount: Mount,
        /// Volume in µL.
        volume: f64,
        /// Where.
        target: Target,
    },
    /// Expel liquid.
    Dispense {
        /// Pipette.
        mount: Mount,
        /// Volume in µL.
        volume: f64,
        /// Where.
        target: Target,
    },
    /// Pipette up and down in place.
    Mix {
        /// Pipette.
        mount: Mount,
        /// Number of cycles.
        repetitions: u32,
        /// Volume per cycle in µL.
        volume: f64,
        /// Where.
        target: Target,
    },
    /// Move without pipetting.
    MoveTo {
        /// Pipette.
        mount: Mount,
        /// Where.
        target: Target,
    },
    /// Push remaining liquid out, at `target` or in place.
    BlowOut {
        /// Pipette.
        mount: Mount,
        /// Where, if not in place.
        target: Option<Target>,
    },
    /// Touch the tip to the well walls.
    TouchTip {
        /// Pipette.
        mount: Mount,
    },
    /// Draw air into the tip.
    AirGap {
        /// Pipette.
        mount: Mount,
        /// Volume in µL.
        volume: f64,
    },
    /// Passive wait for a physical process.
    Delay {
        /// Duration in seconds.
        seconds: f64,
        /// Operator message.
        message: Option<String>,
    },
    /// Operator-facing note.
    Comment {
        /// Text.
        message: String,
    },
    /// Deck lights.
    SetRailLights {
        /// On or off.
        on: bool,
    },
    /// Raise the magnets of the magnetic module.
    EngageMagnet,
    /// Lower the magnets of the magnetic module.
    DisengageMagnet,
    /// Set and hold a temperature module target.
    SetTemperature {
        /// Target in °C.
        celsius: f64,
    },
}

impl Command {
    /// Pipette the command acts on, if any.
    pub fn mount(&self) -> Option<Mount> {
        match self {
            Command::LoadInstrument { mount, .. }
            | Command::SetFlowRate { mount, .. }
            | Command::PickUpTip { mount, .. }
            | Command::DropTip { mount }
            | Command::ReturnTip { mount }
            | Command::Aspirate { mount, .. }
            | Command::Dispense { mount, .. }
            | Command::Mix { mount, .. }
            | Command::MoveTo { mount, .. }
            | Command::BlowOut { mount, .. }
            | Command::TouchTip { mount }
            | Command::AirGap { mount, .. } => Some(*mount),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::LoadLabware {
                load_name,
                slot,
                label,
            } => match label {
                Some(label) => write!(f, "load {} on slot {} as '{}'", load_name, slot, label),
                None => write!(f, "load {} on slot {}", load_name, slot),
            },
            Command::LoadModule { module, slot } => write!(f, "load module {} on slot {}", module, slot),
            Command::LoadInstrument {
                instrument,
                mount,
                tip_racks,
            } => {
                let racks: Vec<String> = tip_racks.iter().map(|s| s.to_string()).collect();
                write!(f, "load {} on {} mount (tips: {})", instrument, mount, racks.join(", "))
            }
            Command::SetFlowRate {
                mount,
                aspirate,
                dispense,
            } => write!(
                f,
                "[{}] flow rate aspirate {} uL/s, dispense {} uL/s",
                mount, aspirate, dispense
            ),
            Command::SetZSpeed { mm_per_sec } => match mm_per_sec {
                Some(speed) => write!(f, "limit Z speed to {} mm/s", speed),
                None => write!(f, "restore Z speed"),
            },
            Command::PickUpTip { mount, tip } => match tip {
                Some(tip) => write!(f, "[{}] pick up tip at {}", mount, tip),
                None => write!(f, "[{}] pick up tip", mount),
            },
            Command::DropTip { mount } => write!(f, "[{}] drop tip", mount),
            Command::ReturnTip { mount } => write!(f, "[{}] return tip", mount),
            Command::Aspirate {
                mount,
                volume,
                target,
            } => write!(f, "[{}] aspirate {} uL from {}", mount, volume, target),
            Command::Dispense {
                mount,
                volume,
                target,
            } => write!(f, "[{}] dispense {} uL into {}", mount, volume, target),
            Command::Mix {
                mount,
                repetitions,
                volume,
                target,
            } => write!(f, "[{}] mix {} x {} uL in {}", mount, repetitions, volume, target),
            Command::MoveTo { mount, target } => write!(f, "[{}] move to {}", mount, target),
            Command::BlowOut { mount, target } => match target {
                Some(target) => write!(f, "[{}] blow out at {}", mount, target),
                None => write!(f, "[{}] blow out", mount),
            },
            Command::TouchTip { mount } => write!(f, "[{}] touch tip", mount),
            Command::AirGap { mount, volume } => write!(f, "[{}] air gap {} uL", mount, volume),
            Command::Delay { seconds, message } => match message {
                Some(message) => write!(f, "delay {}s: {}", seconds, message),
                None => write!(f, "delay {}s", seconds),
            },
            Command::Comment { message } => write!(f, "comment: {}", message),
            Command::SetRailLights { on } => {
                write!(f, "rail lights {}", if *on { "on" } else { "off" })
            }
            Command::EngageMagnet => write!(f, "engage magnet"),
            Command::DisengageMagnet => write!(f, "disengage magnet"),
            Command::SetTemperature { celsius } => write!(f, "set temperature to {} C", celsius),
        }
    }
}
