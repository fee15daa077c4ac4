use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{check_plate_samples, check_range, default_one, default_right, parse_table};
use crate::error::{PlanError, Result};
use crate::labware::{Mount, PlateType, WellName};
use crate::planner::VolumeBounds;
use crate::table::{TableLayout, TransferTable};

/// Options for ligation prep: barcodes from the adapter strip, then chilled
/// master mix into every sample well.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LigationConfig {
    /// Mount of the p20 single-channel.
    #[serde(default = "default_right")]
    pub mount: Mount,
    /// Sample plates on slots 5, 6 (1-2).
    #[serde(default = "default_one")]
    pub plates: usize,
    /// Samples per plate, counted in row order.
    pub samples: Vec<usize>,
    /// Wells to leave out of the master mix pass, per plate.
    #[serde(default)]
    pub skip: Vec<Vec<WellName>>,
    /// Sample plate model.
    #[serde(default)]
    pub plate_type: PlateType,
    /// Master mix per well in µL (1-20).
    pub master_mix_volume: f64,
    /// Barcode adapter per row in µL (1-20).
    #[serde(default = "default_barcode_volume")]
    pub barcode_volume: f64,
    /// Temperature module setpoint for the master mix.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// `barcode_well,dest_slot,dest_well`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Path to the table, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_file: Option<PathBuf>,
}

fn default_barcode_volume() -> f64 {
    2.0
}

fn default_temperature() -> f64 {
    4.0
}

impl LigationConfig {
    /// Slot of the temperature module.
    pub const TEMPERATURE_SLOT: u8 = 1;
    /// Slot of the adapter strip plate.
    pub const ADAPTER_SLOT: u8 = 2;
    /// First sample plate slot.
    pub const FIRST_PLATE_SLOT: u8 = 5;
    /// Tip rack slots.
    pub const TIP_RACK_SLOTS: [u8; 4] = [7, 8, 9, 10];

    /// Parse the inline table with `layout`.
    pub fn parse_table_as(&self, layout: TableLayout) -> Result<TransferTable> {
        parse_table(self.table.as_deref(), self.table_file.as_deref(), layout)
    }

    /// Check counts, skip lists, volumes and the setpoint.
    pub fn validate(&self) -> Result<()> {
        check_range("number of sample plates", self.plates, 1, 2)?;
        check_plate_samples(self.plates, &self.samples, &self.skip)?;
        VolumeBounds::SMALL_TOOL.check(self.master_mix_volume, "master mix")?;
        VolumeBounds::SMALL_TOOL.check(self.barcode_volume, "barcode adapter")?;
        if !(4.0..=95.0).contains(&self.temperature) {
            return Err(PlanError::config(format!(
                "invalid temperature {} C. The temperature module holds 4-95 C",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Skip list for the plate at `index`.
    pub fn skip_for(&self, index: usize) -> &[WellName] {
        self.skip.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}
