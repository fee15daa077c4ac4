//! # Deck Model
//!
//! Slots, wells, plate models and pipette mounts. Everything here is plain
//! data: loading labware onto a physical deck is the driver's job, this module
//! only names what goes where.

mod deck;
mod well;

#[cfg(test)]
mod tests;

pub use deck::{
    load_names, ExtraRack, Location, Mount, PlateDescriptor, PlateStatus, PlateType, Slot, MAX_SLOT,
    TIPS_PER_RACK,
};
pub use well::{WellName, COLUMNS, ROWS};
