use log::{debug, info};

use super::{
    check_record_slots, deck_slot, load_labware, load_plates, load_tip_racks, rail_lights, slots_of, VolumeRule,
    Workflow,
};
use crate::config::StandardizeConfig;
use crate::driver::{Driver, Pipette, Target, TransferOptions};
use crate::error::{PlanError, Result};
use crate::labware::{load_names, Location, PlateDescriptor, WellName};
use crate::planner::{decide_tip_policy, TipSession, ToolId, ToolSet, TransferPass, VolumeBounds};
use crate::table::{TableLayout, TransferTable};

const FLOW_RATE: f64 = 150.0;

const WATER_RULE: VolumeRule = VolumeRule {
    pass: TransferPass::Water,
    tools: ToolSet::PAIR,
    bounds: VolumeBounds::WATER,
    volume_of: |r| r.water_volume.unwrap_or(0.0),
};

const DNA_RULE: VolumeRule = VolumeRule {
    pass: TransferPass::Dna,
    tools: ToolSet::PAIR,
    bounds: VolumeBounds::DNA,
    volume_of: |r| r.volume,
};

/// Water is dispensed just above the well so the tip never touches the
/// contents.
const WATER_HEIGHT: f64 = 1.0;

impl StandardizeConfig {
    fn source_plates(&self) -> Vec<PlateDescriptor> {
        PlateDescriptor::series(
            Self::FIRST_SOURCE_SLOT,
            self.source_plates,
            self.source_plate_type,
            "DNA source plate",
        )
    }

    fn destination_plates(&self) -> Vec<PlateDescriptor> {
        PlateDescriptor::series(
            Self::FIRST_DESTINATION_SLOT,
            self.destination_plates,
            self.destination_plate_type,
            "DNA destination plate",
        )
    }

    fn parse_table(&self) -> Result<TransferTable> {
        self.parse_table_as(TableLayout::Standardize)
    }
}

impl Workflow for StandardizeConfig {
    fn name(&self) -> &'static str {
        "standardize"
    }

    fn validate_options(&self) -> Result<()> {
        self.validate()
    }

    fn transfer_table(&self) -> Result<Option<TransferTable>> {
        self.parse_table().map(Some)
    }

    fn volume_rules(&self) -> Vec<VolumeRule> {
        vec![WATER_RULE, DNA_RULE]
    }

    fn check_deck(&self, table: Option<&TransferTable>) -> Result<()> {
        let table = table.ok_or_else(|| PlanError::config("standardize needs a transfer table"))?;
        check_record_slots(
            table.records(),
            Some(&slots_of(&self.source_plates())),
            &slots_of(&self.destination_plates()),
        )
    }

    fn plan(&self, driver: &mut dyn Driver) -> Result<()> {
        self.validate()?;
        let table = self.parse_table()?;
        let water = WATER_RULE.apply(table.records())?;
        let dna = DNA_RULE.apply(table.records())?;
        self.check_deck(Some(&table))?;

        info!(
            "Standardizing {} wells: {} source plate(s) -> {} destination plate(s), destination {}",
            table.len(),
            self.source_plates,
            self.destination_plates,
            self.destination_status
        );

        rail_lights(driver, true)?;

        let (large_racks, small_racks) = self.extra_rack.tip_slots();
        let large_racks = large_racks.iter().map(|n| deck_slot(*n)).collect::<Result<Vec<_>>>()?;
        let small_racks = small_racks.iter().map(|n| deck_slot(*n)).collect::<Result<Vec<_>>>()?;
        load_tip_racks(driver, load_names::TIPRACK_300UL, &large_racks)?;
        load_tip_racks(driver, load_names::FILTER_TIPRACK_20UL, &small_racks)?;

        let p300 = Pipette::new(load_names::P300_SINGLE, self.large_mount, 300.0);
        let p20 = Pipette::new(load_names::P20_SINGLE, self.small_mount, 20.0);
        p300.load(driver, &large_racks)?;
        p20.load(driver, &small_racks)?;

        let water_slot = deck_slot(Self::WATER_SLOT)?;
        load_labware(driver, load_names::NEST_12_RESERVOIR_15ML, water_slot, Some("water"))?;
        load_plates(driver, &self.source_plates())?;
        load_plates(driver, &self.destination_plates())?;

        for pipette in [&p20, &p300] {
            pipette.set_flow_rate(driver, FLOW_RATE, FLOW_RATE)?;
        }

        // Water pass
        let water_source = Target::well(Location::new(water_slot, WellName::A1));
        let mut small_session = TipSession::new(
            &p20,
            decide_tip_policy(TransferPass::Water, ToolId::Small, self.destination_status),
        );
        let mut large_session = TipSession::new(
            &p300,
            decide_tip_policy(TransferPass::Water, ToolId::Large, self.destination_status),
        );
        info!(
            "Adding water: small tool tips {}, large tool tips {}",
            small_session.policy(),
            large_session.policy()
        );

        for planned in &water {
            let Some(tool) = planned.tool else {
                debug!("No water for {}", planned.record.destination);
                continue;
            };
            let destination = planned.record.destination;
            let target = Target::top(destination, WATER_HEIGHT);
            match tool {
                ToolId::Small => {
                    let new_tip = small_session.prepare(driver, destination)?;
                    let options = TransferOptions {
                        new_tip,
                        ..TransferOptions::default().touch_tip().blow_out()
                    };
                    p20.transfer(driver, planned.volume, water_source, target, options)?;
                }
                ToolId::Large => {
                    let new_tip = large_session.prepare(driver, destination)?;
                    let options = TransferOptions {
                        new_tip,
                        ..TransferOptions::default().blow_out()
                    };
                    p300.transfer(driver, planned.volume, water_source, target, options)?;
                }
            }
        }
        large_session.finish(driver)?;
        small_session.finish(driver)?;

        // DNA pass
        info!("Transferring DNA for {} wells", dna.len());
        for planned in &dna {
            let Some(tool) = planned.tool else { continue };
            let pipette = match tool {
                ToolId::Small => &p20,
                ToolId::Large => &p300,
            };
            let mut session = TipSession::new(
                pipette,
                decide_tip_policy(TransferPass::Dna, tool, self.destination_status),
            );
            let new_tip = session.prepare(driver, planned.record.destination)?;
            let options = TransferOptions {
                new_tip,
                ..TransferOptions::default().touch_tip().blow_out()
            };
            pipette.transfer(
                driver,
                planned.volume,
                Target::well(planned.record.source),
                Target::well(planned.record.destination),
                options,
            )?;
            session.finish(driver)?;
        }

        rail_lights(driver, false)?;
        Ok(())
    }
}
