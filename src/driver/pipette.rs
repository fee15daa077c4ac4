use super::{Command, Driver, DriverError, Target};
use crate::labware::{Location, Mount, Slot};
use crate::table::round_volume;

/// Options for [`Pipette::transfer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferOptions {
    /// Pick up a fresh tip before and drop it after the transfer.
    pub new_tip: bool,
    /// Touch the tip to the source well walls after each aspirate.
    pub touch_tip: bool,
    /// Blow out in the destination well after each dispense.
    pub blow_out: bool,
    /// Mix `(repetitions, volume)` in the destination after each dispense.
    pub mix_after: Option<(u32, f64)>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            new_tip: true,
            touch_tip: false,
            blow_out: false,
            mix_after: None,
        }
    }
}

impl TransferOptions {
    /// Keep whatever tip is attached.
    pub fn keep_tip(mut self) -> Self {
        self.new_tip = false;
        self
    }

    /// Enable touch-tip after aspirating.
    pub fn touch_tip(mut self) -> Self {
        self.touch_tip = true;
        self
    }

    /// Enable blow-out in the destination.
    pub fn blow_out(mut self) -> Self {
        self.blow_out = true;
        self
    }

    /// Mix in the destination after dispensing.
    pub fn mix_after(mut self, repetitions: u32, volume: f64) -> Self {
        self.mix_after = Some((repetitions, volume));
        self
    }
}

/// A pipette attached to a mount.
///
/// Methods issue commands to the driver passed in; the pipette itself holds
/// no tip state, that lives in the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipette {
    model: String,
    mount: Mount,
    max_volume: f64,
}

impl Pipette {
    /// Describe a pipette. Nothing is issued until [`Pipette::load`].
    pub fn new(model: impl Into<String>, mount: Mount, max_volume: f64) -> Self {
        Self {
            model: model.into(),
            mount,
            max_volume,
        }
    }

    /// Mount the pipette is on.
    pub fn mount(&self) -> Mount {
        self.mount
    }

    /// Attach the instrument with its tip racks.
    pub fn load<D: Driver + ?Sized>(&self, driver: &mut D, tip_racks: &[Slot]) -> Result<(), DriverError> {
        driver.execute(Command::LoadInstrument {
            instrument: self.model.clone(),
            mount: self.mount,
            tip_racks: tip_racks.to_vec(),
        })
    }

    /// Set aspirate and dispense flow rates in µL/s.
    pub fn set_flow_rate<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        aspirate: f64,
        dispense: f64,
    ) -> Result<(), DriverError> {
        driver.execute(Command::SetFlowRate {
            mount: self.mount,
            aspirate,
            dispense,
        })
    }

    /// Pick up the next tip from the racks.
    pub fn pick_up_tip<D: Driver + ?Sized>(&self, driver: &mut D) -> Result<(), DriverError> {
        driver.execute(Command::PickUpTip {
            mount: self.mount,
            tip: None,
        })
    }

    /// Pick up a specific (usually parked) tip.
    pub fn pick_up_tip_at<D: Driver + ?Sized>(&self, driver: &mut D, tip: Location) -> Result<(), DriverError> {
        driver.execute(Command::PickUpTip {
            mount: self.mount,
            tip: Some(tip),
        })
    }

    /// Discard the attached tip.
    pub fn drop_tip<D: Driver + ?Sized>(&self, driver: &mut D) -> Result<(), DriverError> {
        driver.execute(Command::DropTip { mount: self.mount })
    }

    /// Park the attached tip back in its rack position.
    pub fn return_tip<D: Driver + ?Sized>(&self, driver: &mut D) -> Result<(), DriverError> {
        driver.execute(Command::ReturnTip { mount: self.mount })
    }

    /// Aspirate `volume` µL at `target`.
    pub fn aspirate<D: Driver + ?Sized>(&self, driver: &mut D, volume: f64, target: Target) -> Result<(), DriverError> {
        driver.execute(Command::Aspirate {
            mount: self.mount,
            volume,
            target,
        })
    }

    /// Dispense `volume` µL at `target`.
    pub fn dispense<D: Driver + ?Sized>(&self, driver: &mut D, volume: f64, target: Target) -> Result<(), DriverError> {
        driver.execute(Command::Dispense {
            mount: self.mount,
            volume,
            target,
        })
    }

    /// Mix in place.
    pub fn mix<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        repetitions: u32,
        volume: f64,
        target: Target,
    ) -> Result<(), DriverError> {
        driver.execute(Command::Mix {
            mount: self.mount,
            repetitions,
            volume,
            target,
        })
    }

    /// Move without pipetting.
    pub fn move_to<D: Driver + ?Sized>(&self, driver: &mut D, target: Target) -> Result<(), DriverError> {
        driver.execute(Command::MoveTo {
            mount: self.mount,
            target,
        })
    }

    /// Blow out at `target`, or in place when `None`.
    pub fn blow_out<D: Driver + ?Sized>(&self, driver: &mut D, target: Option<Target>) -> Result<(), DriverError> {
        driver.execute(Command::BlowOut {
            mount: self.mount,
            target,
        })
    }

    /// Touch the tip to the walls of the current well.
    pub fn touch_tip<D: Driver + ?Sized>(&self, driver: &mut D) -> Result<(), DriverError> {
        driver.execute(Command::TouchTip { mount: self.mount })
    }

    /// Draw `volume` µL of air.
    pub fn air_gap<D: Driver + ?Sized>(&self, driver: &mut D, volume: f64) -> Result<(), DriverError> {
        driver.execute(Command::AirGap {
            mount: self.mount,
            volume,
        })
    }

    /// Move `volume` µL from `source` to `destination`.
    ///
    /// Volumes above the pipette's capacity are split into equal aspirations.
    /// A zero volume issues nothing.
    pub fn transfer<D: Driver + ?Sized>(
        &self,
        driver: &mut D,
        volume: f64,
        source: Target,
        destination: Target,
        options: TransferOptions,
    ) -> Result<(), DriverError> {
        if volume <= 0.0 {
            return Ok(());
        }

        let chunks = (volume / self.max_volume).ceil().max(1.0);
        let per_chunk = round_volume(volume / chunks);

        if options.new_tip {
            self.pick_up_tip(driver)?;
        }
        for _ in 0..chunks as usize {
            self.aspirate(driver, per_chunk, source)?;
            if options.touch_tip {
                self.touch_tip(driver)?;
            }
            self.dispense(driver, per_chunk, destination)?;
            if let Some((repetitions, mix_volume)) = options.mix_after {
                self.mix(driver, repetitions, mix_volume, destination)?;
            }
            if options.blow_out {
                self.blow_out(driver, Some(destination))?;
            }
        }
        if options.new_tip {
            self.drop_tip(driver)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CommandLog;
    use crate::labware::WellName;

    fn loc(slot: u8, well: &str) -> Location {
        Location::new(Slot::new(slot).unwrap(), well.parse::<WellName>().unwrap())
    }

    fn loaded(max_volume: f64) -> (Pipette, CommandLog) {
        let mut log = CommandLog::new();
        let pipette = Pipette::new("p20_single_gen2", Mount::Right, max_volume);
        pipette.load(&mut log, &[Slot::new(8).unwrap()]).unwrap();
        (pipette, log)
    }

    #[test]
    fn test_transfer_with_options() {
        let (p20, mut log) = loaded(20.0);
        let options = TransferOptions::default().touch_tip().blow_out();
        p20.transfer(
            &mut log,
            11.1,
            Target::well(loc(1, "A1")),
            Target::well(loc(2, "B4")),
            options,
        )
        .unwrap();

        let kinds: Vec<String> = log.commands()[1..]
            .iter()
            .map(|c| c.to_string().split_whitespace().nth(1).unwrap_or("").to_string())
            .collect();
        assert_eq!(kinds, vec!["pick", "aspirate", "touch", "dispense", "blow", "drop"]);
        assert!(!log.has_tip(Mount::Right));
    }

    #[test]
    fn test_transfer_splits_large_volume() {
        let (p20, mut log) = loaded(20.0);
        p20.transfer(
            &mut log,
            50.0,
            Target::well(loc(1, "A1")),
            Target::well(loc(2, "A1")),
            TransferOptions::default(),
        )
        .unwrap();

        let stats = log.stats();
        assert_eq!(stats.dispenses, 3);
        assert!((stats.dispensed_ul - 50.01).abs() < 0.02);
        assert_eq!(stats.tip_pickups, 1);
    }

    #[test]
    fn test_transfer_keep_tip_requires_tip() {
        let (p20, mut log) = loaded(20.0);
        let err = p20
            .transfer(
                &mut log,
                5.0,
                Target::well(loc(1, "A1")),
                Target::well(loc(2, "A1")),
                TransferOptions::default().keep_tip(),
            )
            .unwrap_err();
        assert_eq!(err, DriverError::NoTipAttached(Mount::Right));
    }

    #[test]
    fn test_zero_volume_is_noop() {
        let (p20, mut log) = loaded(20.0);
        p20.transfer(
            &mut log,
            0.0,
            Target::well(loc(1, "A1")),
            Target::well(loc(2, "A1")),
            TransferOptions::default(),
        )
        .unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_mix_after() {
        let (p20, mut log) = loaded(20.0);
        p20.transfer(
            &mut log,
            11.1,
            Target::well(loc(1, "A1")),
            Target::well(loc(2, "A1")),
            TransferOptions::default().mix_after(3, 11.1),
        )
        .unwrap();
        assert!(log.commands().iter().any(|c| matches!(
            c,
            Command::Mix {
                repetitions: 3,
                ..
            }
        )));
    }
}
