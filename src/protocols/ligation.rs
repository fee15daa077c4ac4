use log::info;

use super::{
    check_record_slots, deck_slot, load_labware, load_plates, load_tip_racks, rail_lights, sample_wells, slots_of,
    VolumeRule, Workflow,
};
use crate::config::LigationConfig;
use crate::driver::{Command, Driver, Pipette, Target};
use crate::error::{PlanError, Result};
use crate::labware::{load_names, Location, PlateDescriptor, WellName, TIPS_PER_RACK};
use crate::planner::{ToolSet, TransferPass, VolumeBounds};
use crate::table::{TableLayout, TransferTable};

const FLOW_RATE: f64 = 150.0;

const BARCODE_RULE: VolumeRule = VolumeRule {
    pass: TransferPass::Barcode,
    tools: ToolSet::SMALL_ONLY,
    bounds: VolumeBounds::SMALL_TOOL,
    volume_of: |r| r.volume,
};

impl LigationConfig {
    fn plates(&self) -> Vec<PlateDescriptor> {
        PlateDescriptor::series(Self::FIRST_PLATE_SLOT, self.plates, self.plate_type, "sample plate")
    }

    fn parse_table(&self) -> Result<TransferTable> {
        let adapter_slot = deck_slot(Self::ADAPTER_SLOT)?;
        self.parse_table_as(TableLayout::Barcode {
            adapter_slot,
            volume: self.barcode_volume,
        })
    }
}

impl Workflow for LigationConfig {
    fn name(&self) -> &'static str {
        "ligation"
    }

    fn validate_options(&self) -> Result<()> {
        self.validate()
    }

    fn transfer_table(&self) -> Result<Option<TransferTable>> {
        self.parse_table().map(Some)
    }

    fn volume_rules(&self) -> Vec<VolumeRule> {
        vec![BARCODE_RULE]
    }

    fn check_deck(&self, table: Option<&TransferTable>) -> Result<()> {
        let table = table.ok_or_else(|| PlanError::config("ligation needs a barcode table"))?;
        let plates = self.plates();
        check_record_slots(table.records(), None, &slots_of(&plates))?;

        // One tip per barcode and per master mix well
        let mix_wells = sample_wells(&plates, &self.samples, |i| self.skip_for(i)).count();
        let tips = table.len() + mix_wells;
        let capacity = Self::TIP_RACK_SLOTS.len() * TIPS_PER_RACK;
        if tips > capacity {
            return Err(PlanError::config(format!(
                "{} barcodes and {} master mix wells need {} tips but the racks hold {}",
                table.len(),
                mix_wells,
                tips,
                capacity
            )));
        }
        Ok(())
    }

    fn plan(&self, driver: &mut dyn Driver) -> Result<()> {
        self.validate()?;
        let barcodes = self.parse_table()?;
        let barcode_transfers = BARCODE_RULE.apply(barcodes.records())?;
        self.check_deck(Some(&barcodes))?;

        let plates = self.plates();
        let mix_wells: Vec<(&PlateDescriptor, WellName)> =
            sample_wells(&plates, &self.samples, |i| self.skip_for(i)).collect();

        info!(
            "Ligation prep: {} barcode transfers, master mix into {} wells",
            barcodes.len(),
            mix_wells.len()
        );

        rail_lights(driver, true)?;

        let racks = Self::TIP_RACK_SLOTS
            .iter()
            .map(|n| deck_slot(*n))
            .collect::<Result<Vec<_>>>()?;
        load_tip_racks(driver, load_names::TIPRACK_20UL, &racks)?;
        let p20 = Pipette::new(load_names::P20_SINGLE, self.mount, 20.0);
        p20.load(driver, &racks)?;

        load_plates(driver, &plates)?;

        let cold_slot = deck_slot(Self::TEMPERATURE_SLOT)?;
        driver.execute(Command::LoadModule {
            module: load_names::TEMPERATURE_MODULE.to_string(),
            slot: cold_slot,
        })?;
        driver.execute(Command::SetTemperature {
            celsius: self.temperature,
        })?;
        load_labware(
            driver,
            load_names::ALUMINUMBLOCK_24_1_5ML_SNAPCAP,
            cold_slot,
            Some("master mix tube"),
        )?;
        let master_mix = Location::new(cold_slot, WellName::A1);

        load_labware(
            driver,
            load_names::ALUMINUMBLOCK_96_PCR_STRIP,
            deck_slot(Self::ADAPTER_SLOT)?,
            Some("barcode adapter strip tubes"),
        )?;
        p20.set_flow_rate(driver, FLOW_RATE, FLOW_RATE)?;

        // Barcodes: bottom of the well, blow out above it
        for planned in &barcode_transfers {
            let record = planned.record;
            p20.pick_up_tip(driver)?;
            p20.aspirate(driver, planned.volume, Target::well(record.source))?;
            p20.touch_tip(driver)?;
            p20.dispense(driver, planned.volume, Target::bottom(record.destination, 0.0))?;
            p20.move_to(driver, Target::top(record.destination, 0.0))?;
            p20.blow_out(driver, None)?;
            p20.touch_tip(driver)?;
            p20.drop_tip(driver)?;
        }

        // Master mix from the top of each well
        for (plate, well) in &mix_wells {
            let destination = Location::new(plate.slot, *well);
            p20.pick_up_tip(driver)?;
            p20.aspirate(driver, self.master_mix_volume, Target::well(master_mix))?;
            p20.dispense(driver, self.master_mix_volume, Target::top(destination, 0.0))?;
            p20.blow_out(driver, None)?;
            p20.drop_tip(driver)?;
        }

        rail_lights(driver, false)?;
        Ok(())
    }
}
