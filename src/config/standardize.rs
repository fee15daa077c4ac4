use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{check_distinct_mounts, check_range, default_left, default_one, default_right, parse_table};
use crate::error::Result;
use crate::labware::{ExtraRack, Mount, PlateStatus, PlateType};
use crate::table::{TableLayout, TransferTable};

/// Options for the standardization workflow.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StandardizeConfig {
    /// Mount of the p300 single-channel.
    #[serde(default = "default_left")]
    pub large_mount: Mount,
    /// Mount of the p20 single-channel.
    #[serde(default = "default_right")]
    pub small_mount: Mount,
    /// Source plates on slots 1, 2, 3 (1-3).
    #[serde(default = "default_one")]
    pub source_plates: usize,
    /// Destination plates on slots 5, 6 (1-2).
    #[serde(default = "default_one")]
    pub destination_plates: usize,
    /// Source plate model.
    #[serde(default)]
    pub source_plate_type: PlateType,
    /// Destination plate model.
    #[serde(default)]
    pub destination_plate_type: PlateType,
    /// Whether the destination plates held liquid before.
    #[serde(default)]
    pub destination_status: PlateStatus,
    /// Tool that gets the extra tip rack on slot 7.
    #[serde(default)]
    pub extra_rack: ExtraRack,
    /// `source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Path to the table, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_file: Option<PathBuf>,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            large_mount: Mount::Left,
            small_mount: Mount::Right,
            source_plates: 1,
            destination_plates: 1,
            source_plate_type: PlateType::default(),
            destination_plate_type: PlateType::default(),
            destination_status: PlateStatus::default(),
            extra_rack: ExtraRack::default(),
            table: None,
            table_file: None,
        }
    }
}

impl StandardizeConfig {
    /// First source plate slot.
    pub const FIRST_SOURCE_SLOT: u8 = 1;
    /// First destination plate slot.
    pub const FIRST_DESTINATION_SLOT: u8 = 5;
    /// Slot of the water reservoir.
    pub const WATER_SLOT: u8 = 4;

    /// Parse the inline table with `layout`.
    pub fn parse_table_as(&self, layout: TableLayout) -> Result<TransferTable> {
        parse_table(self.table.as_deref(), self.table_file.as_deref(), layout)
    }

    /// Check mounts and plate counts.
    pub fn validate(&self) -> Result<()> {
        check_distinct_mounts(self.large_mount, self.small_mount)?;
        check_range("number of source plates", self.source_plates, 1, 3)?;
        check_range("number of destination plates", self.destination_plates, 1, 2)?;
        Ok(())
    }
}
