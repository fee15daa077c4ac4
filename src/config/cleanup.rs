use serde::{Deserialize, Serialize};
use std::fmt;

use super::{check_range, default_left};
use crate::error::{PlanError, Result};
use crate::labware::Mount;
use crate::planner::DEFAULT_BATCH_SIZE;

/// What binds the DNA to the beads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingReagent {
    /// Bead suspension; mixed in the reservoir before each addition so the
    /// beads do not settle.
    #[default]
    Beads,
    /// PEG solution; no pre-mix.
    Peg,
}

impl fmt::Display for BindingReagent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingReagent::Beads => write!(f, "beads"),
            BindingReagent::Peg => write!(f, "peg"),
        }
    }
}

/// Options for a magnetic bead cleanup on a p300 multi-channel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    /// Mount of the p300 multi-channel.
    #[serde(default = "default_left")]
    pub mount: Mount,
    /// Samples on the magnet plate (1-96). The pipette works by column.
    pub samples: usize,
    /// Beads or PEG.
    pub reagent: BindingReagent,
    /// Volume of product being cleaned in µL.
    pub sample_volume: f64,
    /// Bead or PEG volume in µL. With the sample it must fit in 200 µL.
    pub bead_volume: f64,
    /// Ethanol per wash in µL (at most 190).
    pub ethanol_volume: f64,
    /// Elution buffer in µL (at most 200).
    pub elution_volume: f64,
    /// Bead binding and elution incubation in minutes.
    pub incubation_minutes: f64,
    /// Time for beads to settle on the magnet in minutes.
    pub settling_minutes: f64,
    /// Engage the magnet after elution to clear the eluate.
    pub final_clear: bool,
    /// Columns per ethanol wash group.
    pub batch_size: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            mount: Mount::Left,
            samples: 96,
            reagent: BindingReagent::Beads,
            sample_volume: 88.0,
            bead_volume: 62.0,
            ethanol_volume: 100.0,
            elution_volume: 100.0,
            incubation_minutes: 10.0,
            settling_minutes: 12.0,
            final_clear: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl CleanupConfig {
    /// Slot of the magnetic module.
    pub const MAGNET_SLOT: u8 = 1;
    /// Tip rack slots.
    pub const TIP_RACK_SLOTS: [u8; 3] = [2, 3, 6];
    /// Slot of the reagent reservoir.
    pub const RESERVOIR_SLOT: u8 = 7;
    /// Slot of the liquid waste reservoir.
    pub const WASTE_SLOT: u8 = 11;
    /// Largest volume a plate well holds.
    pub const WELL_CAPACITY: f64 = 200.0;
    /// Largest ethanol wash the reservoir supports.
    pub const MAX_ETHANOL: f64 = 190.0;

    /// Number of plate columns holding samples.
    pub fn columns(&self) -> usize {
        self.samples / 8 + usize::from(self.samples % 8 != 0)
    }

    /// Sample plus bead volume in each well.
    pub fn total_volume(&self) -> f64 {
        self.sample_volume + self.bead_volume
    }

    /// Check the sample count and wash batch size.
    pub fn check_counts(&self) -> Result<()> {
        check_range("number of samples", self.samples, 1, 96)?;
        check_range("wash batch size", self.batch_size, 1, 12)
    }

    /// Check sample count, well capacity and wash settings.
    pub fn validate(&self) -> Result<()> {
        self.check_counts()?;

        for (name, volume) in [
            ("sample volume", self.sample_volume),
            ("bead volume", self.bead_volume),
            ("ethanol volume", self.ethanol_volume),
            ("elution buffer volume", self.elution_volume),
        ] {
            if volume.is_nan() || volume <= 0.0 {
                return Err(PlanError::config(format!("{} must be positive, got {}", name, volume)));
            }
        }
        if self.total_volume() > Self::WELL_CAPACITY {
            return Err(PlanError::config(format!(
                "volume too high: {} uL sample + {} uL beads exceeds the {} uL well capacity",
                self.sample_volume,
                self.bead_volume,
                Self::WELL_CAPACITY
            )));
        }
        if self.elution_volume > Self::WELL_CAPACITY {
            return Err(PlanError::config(format!(
                "elution buffer volume too high: {} uL. Wells hold at most {} uL",
                self.elution_volume,
                Self::WELL_CAPACITY
            )));
        }
        if self.ethanol_volume > Self::MAX_ETHANOL {
            return Err(PlanError::config(format!(
                "ethanol volume too high: {} uL. Maximum is {} uL",
                self.ethanol_volume,
                Self::MAX_ETHANOL
            )));
        }
        for (name, minutes) in [
            ("incubation time", self.incubation_minutes),
            ("settling time", self.settling_minutes),
        ] {
            if minutes.is_nan() || minutes < 0.0 {
                return Err(PlanError::config(format!("{} must not be negative, got {}", name, minutes)));
            }
        }
        Ok(())
    }
}
