use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::WellName;

/// Labware definitions used by the bundled workflows.
pub mod load_names {
    /// 200 µL Bio-Rad PCR plate.
    pub const BIORAD_96_200UL: &str = "biorad_96_wellplate_200ul_pcr";
    /// 100 µL NEST full-skirt PCR plate.
    pub const NEST_96_100UL: &str = "nest_96_wellplate_100ul_pcr_full_skirt";
    /// VWR green plate used as the pooling source.
    pub const VWR_96_200UL_GREEN: &str = "vwr_96_wellplate_200ul_greenplate";
    /// 12-channel 15 mL reservoir.
    pub const NEST_12_RESERVOIR_15ML: &str = "nest_12_reservoir_15ml";
    /// Single-well liquid waste reservoir.
    pub const LIQUID_WASTE_RESERVOIR: &str = "liquid_waste_reservoir";
    /// 2 mL screwcap tube rack.
    pub const TUBERACK_24_2ML_SCREWCAP: &str = "opentrons_24_tuberack_generic_2ml_screwcap";
    /// 1.5 mL snapcap aluminium block.
    pub const ALUMINUMBLOCK_24_1_5ML_SNAPCAP: &str = "opentrons_24_aluminumblock_nest_1.5ml_snapcap";
    /// PCR strip aluminium block.
    pub const ALUMINUMBLOCK_96_PCR_STRIP: &str = "opentrons_96_aluminumblock_generic_pcr_strip_200ul";
    /// 300 µL tips.
    pub const TIPRACK_300UL: &str = "opentrons_96_tiprack_300ul";
    /// 200 µL filter tips.
    pub const FILTER_TIPRACK_200UL: &str = "opentrons_96_filtertiprack_200ul";
    /// 20 µL tips.
    pub const TIPRACK_20UL: &str = "opentrons_96_tiprack_20ul";
    /// 20 µL filter tips.
    pub const FILTER_TIPRACK_20UL: &str = "opentrons_96_filtertiprack_20ul";
    /// Single-channel 300 µL pipette.
    pub const P300_SINGLE: &str = "p300_single_gen2";
    /// Eight-channel 300 µL pipette.
    pub const P300_MULTI: &str = "p300_multi_gen2";
    /// Single-channel 20 µL pipette.
    pub const P20_SINGLE: &str = "p20_single_gen2";
    /// Magnetic module.
    pub const MAGNETIC_MODULE: &str = "magnetic module gen2";
    /// Temperature module.
    pub const TEMPERATURE_MODULE: &str = "temperature module gen2";
}

/// Highest numbered deck slot that can hold labware.
pub const MAX_SLOT: u8 = 11;

/// Tips in one 96-position rack.
pub const TIPS_PER_RACK: usize = 96;

/// A numbered deck position (1..=11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    /// Create a slot, rejecting numbers that are not on the deck.
    pub fn new(number: u8) -> Option<Self> {
        (1..=MAX_SLOT).contains(&number).then_some(Self(number))
    }

    /// Slot number.
    pub fn number(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid slot '{}'", s.trim()))?;
        Slot::new(n).ok_or_else(|| format!("slot {} is not on the deck (1-{})", n, MAX_SLOT))
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| format!("slot {} is not on the deck (1-{})", value, MAX_SLOT))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

/// A well in the labware sitting on a given slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Deck slot holding the labware.
    pub slot: Slot,
    /// Well within that labware.
    pub well: WellName,
}

impl Location {
    /// Create a new location.
    pub fn new(slot: Slot, well: WellName) -> Self {
        Self { slot, well }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot, self.well)
    }
}

/// Pipette mount on the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mount {
    /// Left mount.
    Left,
    /// Right mount.
    Right,
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mount::Left => write!(f, "left"),
            Mount::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Mount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Mount::Left),
            "right" => Ok(Mount::Right),
            other => Err(format!("invalid mount '{}'. Must be 'left' or 'right'", other)),
        }
    }
}

/// PCR plate models accepted by the workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlateType {
    /// Bio-Rad 200 µL plate.
    #[default]
    #[serde(rename = "biorad_200ul")]
    Biorad200ul,
    /// NEST 100 µL full-skirt plate.
    #[serde(rename = "nest_100ul")]
    Nest100ul,
    /// VWR 200 µL green plate, used for pooling.
    #[serde(rename = "vwr_200ul")]
    Vwr200ul,
}

impl PlateType {
    /// Labware definition name used when loading the plate.
    pub fn load_name(&self) -> &'static str {
        match self {
            PlateType::Biorad200ul => load_names::BIORAD_96_200UL,
            PlateType::Nest100ul => load_names::NEST_96_100UL,
            PlateType::Vwr200ul => load_names::VWR_96_200UL_GREEN,
        }
    }

    /// Accepted configuration strings.
    pub fn variants() -> &'static [&'static str] {
        &["biorad_200ul", "nest_100ul", "vwr_200ul"]
    }
}

impl fmt::Display for PlateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateType::Biorad200ul => write!(f, "biorad_200ul"),
            PlateType::Nest100ul => write!(f, "nest_100ul"),
            PlateType::Vwr200ul => write!(f, "vwr_200ul"),
        }
    }
}

impl FromStr for PlateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "biorad_200ul" => Ok(PlateType::Biorad200ul),
            "nest_100ul" => Ok(PlateType::Nest100ul),
            "vwr_200ul" => Ok(PlateType::Vwr200ul),
            other => Err(format!(
                "invalid plate type '{}'. Valid options: {}",
                other,
                PlateType::variants().join(", ")
            )),
        }
    }
}

/// Whether a destination plate previously held other liquid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateStatus {
    /// Fresh plate; water additions may share a tip.
    #[serde(alias = "fresh")]
    Clean,
    /// Pre-used plate; every addition takes a fresh tip.
    #[default]
    Used,
}

impl fmt::Display for PlateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateStatus::Clean => write!(f, "clean"),
            PlateStatus::Used => write!(f, "used"),
        }
    }
}

impl FromStr for PlateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clean" | "fresh" => Ok(PlateStatus::Clean),
            "used" => Ok(PlateStatus::Used),
            other => Err(format!(
                "invalid destination plate status '{}'. Must be 'clean' or 'used'",
                other
            )),
        }
    }
}

/// Which tool gets the optional third tip rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtraRack {
    /// No extra rack.
    #[default]
    #[serde(rename = "none")]
    None,
    /// Extra 20 µL rack in slot 7.
    #[serde(rename = "20")]
    Small,
    /// Extra 300 µL rack in slot 7.
    #[serde(rename = "300")]
    Large,
}

impl ExtraRack {
    /// Tip rack slots as `(large tool, small tool)`.
    pub fn tip_slots(&self) -> (&'static [u8], &'static [u8]) {
        match self {
            ExtraRack::None => (&[10, 11], &[8, 9]),
            ExtraRack::Large => (&[7, 10, 11], &[8, 9]),
            ExtraRack::Small => (&[10, 11], &[7, 8, 9]),
        }
    }
}

impl FromStr for ExtraRack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(ExtraRack::None),
            "20" => Ok(ExtraRack::Small),
            "300" => Ok(ExtraRack::Large),
            other => Err(format!(
                "invalid extra tip rack type '{}'. Must be '20', '300', or 'none'",
                other
            )),
        }
    }
}

/// A plate to be loaded on the deck.
///
/// Workflows build a `Vec<PlateDescriptor>` and iterate it instead of
/// branching per plate count and plate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateDescriptor {
    /// Deck slot.
    pub slot: Slot,
    /// Plate model.
    pub plate_type: PlateType,
    /// Display label.
    pub label: String,
}

impl PlateDescriptor {
    /// Describe `count` plates of one type on consecutive slots starting at
    /// `first_slot`, labelled `"{prefix} 1"`, `"{prefix} 2"`, ...
    pub fn series(first_slot: u8, count: usize, plate_type: PlateType, prefix: &str) -> Vec<Self> {
        (0..count)
            .filter_map(|i| {
                let slot = Slot::new(first_slot.checked_add(u8::try_from(i).ok()?)?)?;
                Some(PlateDescriptor {
                    slot,
                    plate_type,
                    label: format!("{} {}", prefix, i + 1),
                })
            })
            .collect()
    }
}
