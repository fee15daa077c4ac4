use log::info;

use super::{
    check_record_slots, deck_slot, load_labware, load_plates, load_tip_racks, rail_lights, slots_of, VolumeRule, Workflow,
};
use crate::config::PoolConfig;
use crate::driver::{Driver, Pipette, Target, TransferOptions};
use crate::error::{PlanError, Result};
use crate::labware::{load_names, PlateDescriptor, PlateStatus, TIPS_PER_RACK};
use crate::planner::{decide_tip_policy, TipPolicy, TipSession, ToolId, ToolSet, TransferPass, VolumeBounds};
use crate::table::{round_volume, TableLayout, TransferTable};

const FLOW_RATE: f64 = 150.0;

/// The 24-position aluminum block is 4 rows by 6 columns.
const TUBE_ROWS: u8 = 4;
const TUBE_COLUMNS: u8 = 6;

const POOL_RULE: VolumeRule = VolumeRule {
    pass: TransferPass::Pool,
    tools: ToolSet::SMALL_ONLY,
    bounds: VolumeBounds::SMALL_TOOL,
    volume_of: |r| r.volume,
};

impl PoolConfig {
    fn plates(&self) -> Vec<PlateDescriptor> {
        PlateDescriptor::series(Self::FIRST_PLATE_SLOT, self.plates, self.plate_type, "DNA plate")
    }

    fn parse_table(&self) -> Result<TransferTable> {
        let tube_rack = deck_slot(Self::TUBE_RACK_SLOT)?;
        self.parse_table_as(TableLayout::Pool { tube_rack })
    }

    fn tip_policy(&self) -> TipPolicy {
        decide_tip_policy(TransferPass::Pool, ToolId::Small, PlateStatus::Used)
    }
}

impl Workflow for PoolConfig {
    fn name(&self) -> &'static str {
        "pool"
    }

    fn validate_options(&self) -> Result<()> {
        self.validate()
    }

    fn transfer_table(&self) -> Result<Option<TransferTable>> {
        self.parse_table().map(Some)
    }

    fn volume_rules(&self) -> Vec<VolumeRule> {
        vec![POOL_RULE]
    }

    fn check_deck(&self, table: Option<&TransferTable>) -> Result<()> {
        let table = table.ok_or_else(|| PlanError::config("pool needs a transfer table"))?;
        let tube_rack = deck_slot(Self::TUBE_RACK_SLOT)?;
        check_record_slots(table.records(), Some(&slots_of(&self.plates())), &[tube_rack])?;

        for (i, record) in table.iter().enumerate() {
            let tube = record.destination.well;
            if tube.row() >= TUBE_ROWS || tube.column() > TUBE_COLUMNS {
                return Err(PlanError::config(format!(
                    "record {}: tube {} is not in the 24-tube rack (A1-D6)",
                    i + 1,
                    tube
                )));
            }
        }

        // Volumes rounding to zero are skipped without a tip
        let tips = self.tip_policy().tips_needed(
            table
                .iter()
                .filter(|r| round_volume(r.volume) > 0.0)
                .map(|r| r.destination),
        );
        if tips > TIPS_PER_RACK {
            return Err(PlanError::config(format!(
                "pooling changes tips {} times but the rack on slot {} holds {}",
                tips,
                Self::TIP_RACK_SLOT,
                TIPS_PER_RACK
            )));
        }
        Ok(())
    }

    fn plan(&self, driver: &mut dyn Driver) -> Result<()> {
        self.validate()?;
        let table = self.parse_table()?;
        let transfers = POOL_RULE.apply(table.records())?;
        self.check_deck(Some(&table))?;

        info!("Pooling {} wells from {} plate(s)", table.len(), self.plates);

        rail_lights(driver, true)?;

        let racks = [deck_slot(Self::TIP_RACK_SLOT)?];
        load_tip_racks(driver, load_names::TIPRACK_20UL, &racks)?;
        let p20 = Pipette::new(load_names::P20_SINGLE, self.mount, 20.0);
        p20.load(driver, &racks)?;

        load_labware(
            driver,
            load_names::ALUMINUMBLOCK_24_1_5ML_SNAPCAP,
            deck_slot(Self::TUBE_RACK_SLOT)?,
            Some("pool tubes"),
        )?;
        load_plates(driver, &self.plates())?;
        p20.set_flow_rate(driver, FLOW_RATE, FLOW_RATE)?;

        let mut session = TipSession::new(&p20, self.tip_policy());
        for planned in &transfers {
            if planned.tool.is_none() {
                continue;
            }
            let destination = planned.record.destination;
            let new_tip = session.prepare(driver, destination)?;
            let options = TransferOptions {
                new_tip,
                ..TransferOptions::default().touch_tip().blow_out()
            };
            p20.transfer(
                driver,
                planned.volume,
                Target::well(planned.record.source),
                Target::well(destination),
                options,
            )?;
        }
        session.finish(driver)?;

        rail_lights(driver, false)?;
        Ok(())
    }
}
