use serde::{Deserialize, Serialize};

use super::{check_plate_samples, check_range, default_one, default_right};
use crate::error::Result;
use crate::labware::{Mount, PlateType, WellName};
use crate::planner::VolumeBounds;

/// Options for distributing master mix from a tube into sample plates.
///
/// ```toml
/// [distribute]
/// mount = "right"
/// plates = 2
/// racks = 2
/// samples = [3, 4]
/// skip = [["A1", "A2"], ["A4"]]
/// master_mix_volume = 11.1
/// mix = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DistributeConfig {
    /// Mount of the p20 single-channel.
    #[serde(default = "default_right")]
    pub mount: Mount,
    /// Sample plates on slots 2-6 (1-5).
    #[serde(default = "default_one")]
    pub plates: usize,
    /// 20 µL tip racks from slot 7 upward (1-5).
    #[serde(default = "default_one")]
    pub racks: usize,
    /// Samples per plate, counted in row order (`12` is A1-A12).
    pub samples: Vec<usize>,
    /// Wells to leave out, per plate. Skipped wells still count as samples.
    #[serde(default)]
    pub skip: Vec<Vec<WellName>>,
    /// Sample plate model.
    #[serde(default)]
    pub plate_type: PlateType,
    /// Master mix per well in µL (1-20).
    pub master_mix_volume: f64,
    /// Mix three times after dispensing.
    #[serde(default)]
    pub mix: bool,
}

impl DistributeConfig {
    /// Slot of the tube rack holding master mix in A1.
    pub const TUBE_RACK_SLOT: u8 = 1;
    /// First sample plate slot.
    pub const FIRST_PLATE_SLOT: u8 = 2;
    /// First tip rack slot.
    pub const FIRST_RACK_SLOT: u8 = 7;

    /// Check counts, skip lists and the master mix volume.
    pub fn validate(&self) -> Result<()> {
        check_range("number of sample plates", self.plates, 1, 5)?;
        check_range("number of tip racks", self.racks, 1, 5)?;
        check_plate_samples(self.plates, &self.samples, &self.skip)?;
        VolumeBounds::SMALL_TOOL.check(self.master_mix_volume, "master mix")?;
        Ok(())
    }

    /// Skip list for the plate at `index`; plates without one skip nothing.
    pub fn skip_for(&self, index: usize) -> &[WellName] {
        self.skip.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}
