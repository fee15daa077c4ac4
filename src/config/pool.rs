use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{check_range, default_one, default_right, parse_table};
use crate::error::Result;
use crate::labware::{Mount, PlateType};
use crate::table::{TableLayout, TransferTable};

/// Options for pooling plate wells into tubes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Mount of the p20 single-channel.
    #[serde(default = "default_right")]
    pub mount: Mount,
    /// Source plates, loaded from slot 3 upward (1-9).
    #[serde(default = "default_one")]
    pub plates: usize,
    /// Source plate model.
    #[serde(default = "default_pool_plate")]
    pub plate_type: PlateType,
    /// `source_slot,source_well,tube_well,vol_dna`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Path to the table, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_file: Option<PathBuf>,
}

fn default_pool_plate() -> PlateType {
    PlateType::Vwr200ul
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mount: Mount::Right,
            plates: 1,
            plate_type: PlateType::Vwr200ul,
            table: None,
            table_file: None,
        }
    }
}

impl PoolConfig {
    /// Slot of the aluminum block holding the pool tubes.
    pub const TUBE_RACK_SLOT: u8 = 1;
    /// Slot of the 20 µL tip rack.
    pub const TIP_RACK_SLOT: u8 = 2;
    /// First source plate slot.
    pub const FIRST_PLATE_SLOT: u8 = 3;

    /// Parse the inline table with `layout`.
    pub fn parse_table_as(&self, layout: TableLayout) -> Result<TransferTable> {
        parse_table(self.table.as_deref(), self.table_file.as_deref(), layout)
    }

    /// Check the plate count.
    pub fn validate(&self) -> Result<()> {
        check_range("number of plates", self.plates, 1, 9)
    }
}
