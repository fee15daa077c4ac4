use log::info;

use super::{deck_slot, load_labware, load_plates, load_tip_racks, rail_lights, sample_wells, slots_from, VolumeRule, Workflow};
use crate::config::DistributeConfig;
use crate::driver::{Driver, Pipette, Target, TransferOptions};
use crate::error::{PlanError, Result};
use crate::labware::{load_names, Location, PlateDescriptor, PlateStatus, WellName, TIPS_PER_RACK};
use crate::planner::{decide_tip_policy, TipSession, ToolId, ToolSet, TransferPass, VolumeBounds};
use crate::table::{TransferRecord, TransferTable};

const FLOW_RATE: f64 = 150.0;
const MIX_REPETITIONS: u32 = 3;

const MASTER_MIX_RULE: VolumeRule = VolumeRule {
    pass: TransferPass::MasterMix,
    tools: ToolSet::SMALL_ONLY,
    bounds: VolumeBounds::SMALL_TOOL,
    volume_of: |r| r.volume,
};

impl DistributeConfig {
    fn plates(&self) -> Vec<PlateDescriptor> {
        PlateDescriptor::series(Self::FIRST_PLATE_SLOT, self.plates, self.plate_type, "sample plate")
    }

    /// One master-mix addition per non-skipped sample well, plate by plate.
    fn additions(&self) -> Result<Vec<TransferRecord>> {
        let tube = Location::new(deck_slot(Self::TUBE_RACK_SLOT)?, WellName::A1);
        let plates = self.plates();
        let records: Vec<TransferRecord> = sample_wells(&plates, &self.samples, |i| self.skip_for(i))
            .map(|(plate, well)| TransferRecord {
                source: tube,
                destination: Location::new(plate.slot, well),
                volume: self.master_mix_volume,
                water_volume: None,
            })
            .collect();
        Ok(records)
    }
}

impl Workflow for DistributeConfig {
    fn name(&self) -> &'static str {
        "distribute"
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
        let additions = self.additions()?.len();
        let tips = self.racks.saturating_mul(TIPS_PER_RACK);
        if additions > tips {
            return Err(PlanError::config(format!(
                "{} master mix additions need {} tips but {} rack(s) hold {}",
                additions, additions, self.racks, tips
            )));
        }
        Ok(())
    }

    fn plan(&self, driver: &mut dyn Driver) -> Result<()> {
        self.validate()?;
        let additions = self.additions()?;
        let transfers = MASTER_MIX_RULE.apply(&additions)?;
        self.check_deck(None)?;

        info!(
            "Distributing {} uL master mix into {} wells on {} plate(s)",
            self.master_mix_volume,
            transfers.len(),
            self.plates
        );

        rail_lights(driver, true)?;

        let racks = slots_from(Self::FIRST_RACK_SLOT, self.racks)?;
        load_tip_racks(driver, load_names::FILTER_TIPRACK_20UL, &racks)?;
        let p20 = Pipette::new(load_names::P20_SINGLE, self.mount, 20.0);
        p20.load(driver, &racks)?;

        load_plates(driver, &self.plates())?;
        let tube_slot = deck_slot(Self::TUBE_RACK_SLOT)?;
        load_labware(
            driver,
            load_names::TUBERACK_24_2ML_SCREWCAP,
            tube_slot,
            Some("master mix tube"),
        )?;
        p20.set_flow_rate(driver, FLOW_RATE, FLOW_RATE)?;

        let mut options = TransferOptions::default().touch_tip().blow_out();
        if self.mix {
            options = options.mix_after(MIX_REPETITIONS, self.master_mix_volume);
        }

        let policy = decide_tip_policy(TransferPass::MasterMix, ToolId::Small, PlateStatus::Used);
        for planned in &transfers {
            let mut session = TipSession::new(&p20, policy);
            let new_tip = session.prepare(driver, planned.record.destination)?;
            p20.transfer(
                driver,
                planned.volume,
                Target::well(planned.record.source),
                Target::well(planned.record.destination),
                TransferOptions { new_tip, ..options },
            )?;
            session.finish(driver)?;
        }

        rail_lights(driver, false)?;
        Ok(())
    }
}
