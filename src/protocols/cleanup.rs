//! Magnetic bead cleanup on a p300 multi-channel.
//!
//! Each sample column gets one "parked" tip when beads are added. That tip
//! is returned to its rack position and picked up again for every removal
//! from the same column (supernatant, both ethanol washes), so nothing is
//! carried between columns. Fresh tips are used only for adding ethanol and
//! elution buffer.

use log::{debug, info};
use std::ops::Range;

use super::{deck_slot, load_labware, rail_lights, reservoir_well, VolumeRule, Workflow};
use crate::config::{BindingReagent, CleanupConfig};
use crate::driver::{Command, Driver, Pipette, Target, TransferOptions};
use crate::error::{PlanError, Result};
use crate::labware::{load_names, Location, Slot, WellName, COLUMNS};
use crate::planner::{WashSchedule, AIR_DRY_SECONDS};
use crate::table::TransferTable;

const TIPS_COLUMNS_PER_RACK: usize = COLUMNS as usize;
const AIR_GAP: f64 = 10.0;
const MIX_CYCLES: u32 = 5;
const SLOW_Z_SPEED: f64 = 10.0;

/// Reservoir columns, zero-based.
const BEADS_COLUMN: usize = 0;
const ETHANOL_COLUMNS: [usize; 2] = [2, 3];
const WATER_COLUMN: usize = 5;

/// Deck positions resolved once the options are valid.
struct Deck {
    magnet: Slot,
    tip_racks: Vec<Slot>,
    waste: Target,
    beads: Location,
    ethanol: [Location; 2],
    water: Location,
}

impl Deck {
    fn new() -> Result<Self> {
        let reservoir = deck_slot(CleanupConfig::RESERVOIR_SLOT)?;
        let waste_slot = deck_slot(CleanupConfig::WASTE_SLOT)?;
        Ok(Self {
            magnet: deck_slot(CleanupConfig::MAGNET_SLOT)?,
            tip_racks: CleanupConfig::TIP_RACK_SLOTS
                .iter()
                .map(|n| deck_slot(*n))
                .collect::<Result<Vec<_>>>()?,
            waste: Target::top(Location::new(waste_slot, WellName::A1), 0.0),
            beads: Location::new(reservoir, reservoir_well(BEADS_COLUMN)?),
            ethanol: [
                Location::new(reservoir, reservoir_well(ETHANOL_COLUMNS[0])?),
                Location::new(reservoir, reservoir_well(ETHANOL_COLUMNS[1])?),
            ],
            water: Location::new(reservoir, reservoir_well(WATER_COLUMN)?),
        })
    }

    /// Column `index` of the sample plate on the magnet.
    fn column(&self, index: usize) -> Result<Location> {
        Ok(Location::new(self.magnet, reservoir_well(index)?))
    }

    /// Parked tip for sample column `index`: the matching column of the
    /// first rack.
    fn parked_tip(&self, index: usize) -> Result<Location> {
        let rack = self
            .tip_racks
            .first()
            .ok_or_else(|| PlanError::config("no tip racks loaded"))?;
        Ok(Location::new(*rack, reservoir_well(index)?))
    }
}

impl CleanupConfig {
    fn schedule(&self) -> WashSchedule {
        WashSchedule::new(self.columns(), self.batch_size)
    }

    /// Tip columns picked from the racks in order, excluding parked tips.
    fn fresh_tips_needed(&self, schedule: &WashSchedule) -> usize {
        2 * schedule.groups.len() + self.columns()
    }
}

impl Workflow for CleanupConfig {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn validate_options(&self) -> Result<()> {
        self.validate()
    }

    fn transfer_table(&self) -> Result<Option<TransferTable>> {
        Ok(None)
    }

    fn volume_rules(&self) -> Vec<VolumeRule> {
        Vec::new()
    }

    fn check_deck(&self, _table: Option<&TransferTable>) -> Result<()> {
        // The schedule is only defined for valid counts
        self.check_counts()?;
        let schedule = self.schedule();
        let capacity = Self::TIP_RACK_SLOTS.len() * TIPS_COLUMNS_PER_RACK;
        let available = capacity.saturating_sub(self.columns());
        let needed = self.fresh_tips_needed(&schedule);
        if needed > available {
            return Err(PlanError::config(format!(
                "cleanup of {} columns in groups of {} needs {} tip columns plus {} parked, but the racks hold {}",
                self.columns(),
                self.batch_size,
                needed,
                self.columns(),
                capacity
            )));
        }
        Ok(())
    }

    fn plan(&self, driver: &mut dyn Driver) -> Result<()> {
        self.validate()?;
        self.check_deck(None)?;
        let schedule = self.schedule();
        let deck = Deck::new()?;
        let columns = self.columns();

        info!(
            "Bead cleanup of {} samples ({} columns, {} wash groups)",
            self.samples,
            columns,
            schedule.groups.len()
        );

        rail_lights(driver, true)?;
        for slot in &deck.tip_racks {
            load_labware(driver, load_names::FILTER_TIPRACK_200UL, *slot, None)?;
        }
        let p300 = Pipette::new(load_names::P300_MULTI, self.mount, 300.0);
        p300.load(driver, &deck.tip_racks)?;

        driver.execute(Command::LoadModule {
            module: load_names::MAGNETIC_MODULE.to_string(),
            slot: deck.magnet,
        })?;
        load_labware(driver, load_names::BIORAD_96_200UL, deck.magnet, Some("sample plate"))?;
        load_labware(
            driver,
            load_names::LIQUID_WASTE_RESERVOIR,
            deck.waste.location.slot,
            Some("waste"),
        )?;
        load_labware(
            driver,
            load_names::NEST_12_RESERVOIR_15ML,
            deck.beads.slot,
            Some("reagents"),
        )?;

        self.add_beads(driver, &p300, &deck)?;

        delay(driver, self.incubation_minutes * 60.0, "Incubating beads with samples")?;
        driver.execute(Command::EngageMagnet)?;
        comment(
            driver,
            format!("Letting beads settle for {} minutes", self.settling_minutes),
        )?;
        delay(driver, self.settling_minutes * 60.0, "Beads settling on the magnet")?;

        info!("Removing supernatant");
        for index in 0..columns {
            self.remove_liquid(driver, &p300, &deck, index, self.total_volume(), None, true)?;
        }

        for (wash, ethanol) in deck.ethanol.iter().enumerate() {
            info!("Ethanol wash {}", wash + 1);
            let last_wash = wash + 1 == deck.ethanol.len();
            for (g, group) in schedule.groups.iter().enumerate() {
                self.add_ethanol(driver, &p300, &deck, *ethanol, group.clone())?;

                let soak = schedule.soak_seconds(g);
                if soak > 0.0 {
                    comment(driver, format!("Let ethanol sit for {} seconds", soak))?;
                    delay(driver, soak, "Ethanol soak")?;
                }

                for index in group.clone() {
                    // Tips of early-eluted columns stay parked for the elution mix
                    let keep = !last_wash || early_columns(&schedule).contains(&index);
                    self.remove_liquid(driver, &p300, &deck, index, self.ethanol_volume, Some(AIR_GAP), keep)?;
                }

                if last_wash && schedule.early_elution_after == Some(g) {
                    debug!("Adding elution buffer early to columns {:?}", early_columns(&schedule));
                    for index in early_columns(&schedule) {
                        p300.pick_up_tip(driver)?;
                        p300.transfer(
                            driver,
                            self.elution_volume,
                            Target::bottom(deck.water, 1.0),
                            Target::top(deck.column(index)?, 0.0),
                            TransferOptions::default().keep_tip(),
                        )?;
                        p300.drop_tip(driver)?;
                    }
                }
            }
        }

        if schedule.air_dry {
            delay(driver, AIR_DRY_SECONDS, "Drying the beads")?;
        }
        driver.execute(Command::DisengageMagnet)?;

        info!("Eluting");
        p300.set_flow_rate(driver, 50.0, 50.0)?;
        let early = early_columns(&schedule);
        for index in early.clone() {
            let column = deck.column(index)?;
            p300.pick_up_tip_at(driver, deck.parked_tip(index)?)?;
            p300.mix(driver, MIX_CYCLES, self.elution_volume, Target::bottom(column, 2.0))?;
            finish_column(driver, &p300, column)?;
        }
        for index in early.end..columns {
            let column = deck.column(index)?;
            p300.pick_up_tip(driver)?;
            p300.transfer(
                driver,
                self.elution_volume,
                Target::bottom(deck.water, 1.0),
                Target::bottom(column, 3.0),
                TransferOptions::default().keep_tip(),
            )?;
            p300.mix(driver, MIX_CYCLES, self.elution_volume, Target::bottom(column, 2.0))?;
            finish_column(driver, &p300, column)?;
        }

        comment(
            driver,
            format!("Incubating the eluate for {} minutes", self.incubation_minutes),
        )?;
        delay(driver, self.incubation_minutes * 60.0, "Elution incubation")?;

        if self.final_clear {
            driver.execute(Command::EngageMagnet)?;
            delay(driver, self.settling_minutes * 60.0, "Clearing beads from the eluate")?;
        }

        rail_lights(driver, false)?;
        Ok(())
    }
}

impl CleanupConfig {
    fn add_beads(&self, driver: &mut dyn Driver, p300: &Pipette, deck: &Deck) -> Result<()> {
        info!("Adding {} uL {} to {} columns", self.bead_volume, self.reagent, self.columns());
        for index in 0..self.columns() {
            let column = deck.column(index)?;
            p300.pick_up_tip_at(driver, deck.parked_tip(index)?)?;
            p300.set_flow_rate(driver, 100.0, 100.0)?;
            if self.reagent == BindingReagent::Beads {
                p300.mix(driver, 2, 150.0, Target::bottom(deck.beads, 1.0))?;
            }
            p300.set_flow_rate(driver, 50.0, 50.0)?;
            p300.transfer(
                driver,
                self.bead_volume,
                Target::bottom(deck.beads, 1.0),
                Target::bottom(column, 3.0),
                TransferOptions::default().keep_tip(),
            )?;
            p300.mix(driver, MIX_CYCLES, self.total_volume(), Target::bottom(column, 2.0))?;
            p300.move_to(driver, Target::top(column, 0.0))?;
            p300.blow_out(driver, None)?;
            p300.touch_tip(driver)?;
            p300.return_tip(driver)?;
        }
        Ok(())
    }

    fn add_ethanol(
        &self,
        driver: &mut dyn Driver,
        p300: &Pipette,
        deck: &Deck,
        ethanol: Location,
        group: Range<usize>,
    ) -> Result<()> {
        p300.set_flow_rate(driver, 100.0, 150.0)?;
        p300.pick_up_tip(driver)?;
        for index in group {
            let column = deck.column(index)?;
            p300.transfer(
                driver,
                self.ethanol_volume,
                Target::bottom(ethanol, 1.0),
                Target::top(column, -1.0),
                TransferOptions::default().keep_tip(),
            )?;
            p300.move_to(driver, Target::top(column, 0.0))?;
            p300.blow_out(driver, None)?;
            delay(driver, 1.0, "")?;
        }
        p300.drop_tip(driver)?;
        Ok(())
    }

    /// Slowly draw `volume` off the beads of column `index` with its parked
    /// tip and send it to waste. The tip is parked again when `keep` is set,
    /// otherwise discarded.
    fn remove_liquid(
        &self,
        driver: &mut dyn Driver,
        p300: &Pipette,
        deck: &Deck,
        index: usize,
        volume: f64,
        air_gap: Option<f64>,
        keep: bool,
    ) -> Result<()> {
        let column = deck.column(index)?;
        let aspirate_rate = if air_gap.is_some() { 40.0 } else { 5.0 };
        let dispense_rate = if air_gap.is_some() { 150.0 } else { 100.0 };

        p300.set_flow_rate(driver, aspirate_rate, dispense_rate)?;
        p300.pick_up_tip_at(driver, deck.parked_tip(index)?)?;
        p300.move_to(driver, Target::top(column, 0.0))?;
        driver.execute(Command::SetZSpeed {
            mm_per_sec: Some(SLOW_Z_SPEED),
        })?;
        p300.aspirate(driver, volume, Target::bottom(column, 1.0))?;
        p300.move_to(driver, Target::top(column, 0.0))?;
        driver.execute(Command::SetZSpeed { mm_per_sec: None })?;
        delay(driver, 1.0, "")?;

        let mut waste_volume = volume;
        if let Some(gap) = air_gap {
            p300.air_gap(driver, gap)?;
            waste_volume += gap;
        }
        p300.dispense(driver, waste_volume, deck.waste)?;
        p300.blow_out(driver, Some(deck.waste))?;

        if keep {
            p300.return_tip(driver)?;
        } else {
            p300.drop_tip(driver)?;
        }
        Ok(())
    }
}

/// Columns that receive elution buffer during the second wash.
fn early_columns(schedule: &WashSchedule) -> Range<usize> {
    match schedule.early_elution_after {
        Some(_) => schedule.elution.first().cloned().unwrap_or(0..0),
        None => 0..0,
    }
}

fn finish_column(driver: &mut dyn Driver, p300: &Pipette, column: Location) -> Result<()> {
    p300.move_to(driver, Target::top(column, 0.0))?;
    p300.blow_out(driver, None)?;
    p300.touch_tip(driver)?;
    p300.drop_tip(driver)?;
    Ok(())
}

fn delay(driver: &mut dyn Driver, seconds: f64, message: &str) -> Result<()> {
    driver.execute(Command::Delay {
        seconds,
        message: (!message.is_empty()).then(|| message.to_string()),
    })?;
    Ok(())
}

fn comment(driver: &mut dyn Driver, message: String) -> Result<()> {
    driver.execute(Command::Comment { message })?;
    Ok(())
}
