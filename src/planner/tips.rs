use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ToolId;
use crate::driver::{Driver, DriverError, Pipette};
use crate::labware::{Location, PlateStatus};

/// When a pipette changes tips during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipPolicy {
    /// Fresh tip for every record.
    Always,
    /// One tip for the whole pass.
    Never,
    /// Keep the tip while consecutive records share a destination.
    ReuseUntilDestinationChanges,
}

impl fmt::Display for TipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipPolicy::Always => write!(f, "always"),
            TipPolicy::Never => write!(f, "never"),
            TipPolicy::ReuseUntilDestinationChanges => write!(f, "reuse-until-destination-changes"),
        }
    }
}

impl TipPolicy {
    /// Tips a pass uses for transfers into `destinations`, in order.
    pub fn tips_needed(self, destinations: impl IntoIterator<Item = Location>) -> usize {
        let mut last = None;
        let mut tips = 0;
        for destination in destinations {
            let fresh = match self {
                TipPolicy::Always => true,
                TipPolicy::Never => last.is_none(),
                TipPolicy::ReuseUntilDestinationChanges => last != Some(destination),
            };
            if fresh {
                tips += 1;
            }
            last = Some(destination);
        }
        tips
    }
}

/// The kind of liquid a pass moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPass {
    /// Diluent added ahead of the sample.
    Water,
    /// Sample DNA moved between plates.
    Dna,
    /// Samples combined into shared tubes.
    Pool,
    /// Master mix distributed into sample wells.
    MasterMix,
    /// Barcode adapters added to sample wells.
    Barcode,
}

/// Decide the tip policy for one record of a pass.
///
/// Water goes in first. The large tool dispenses it at the top of the well,
/// never touching the contents, so it always keeps one tip. The small tool
/// keeps one tip only on a clean plate; on a used plate it changes every
/// time. DNA, master mix and barcodes always take a fresh tip so unrelated
/// sources never share one. Pooling keeps a tip per destination tube.
pub fn decide_tip_policy(pass: TransferPass, tool: ToolId, status: PlateStatus) -> TipPolicy {
    match (pass, tool, status) {
        (TransferPass::Water, ToolId::Large, _) => TipPolicy::Never,
        (TransferPass::Water, ToolId::Small, PlateStatus::Clean) => TipPolicy::Never,
        (TransferPass::Water, ToolId::Small, PlateStatus::Used) => TipPolicy::Always,
        (TransferPass::Pool, _, _) => TipPolicy::ReuseUntilDestinationChanges,
        (TransferPass::Dna | TransferPass::MasterMix | TransferPass::Barcode, _, _) => TipPolicy::Always,
    }
}

/// Applies a [`TipPolicy`] to one pipette across a pass.
///
/// Call [`TipSession::prepare`] before each transfer and use its return value
/// as the transfer's `new_tip` flag; call [`TipSession::finish`] once after
/// the last record. Tips for the `Never` and reuse policies are picked up on
/// first use, so a pass that never needs the pipette costs no tip.
#[derive(Debug)]
pub struct TipSession<'p> {
    pipette: &'p Pipette,
    policy: TipPolicy,
    holding: bool,
    last_destination: Option<Location>,
}

impl<'p> TipSession<'p> {
    /// Start a session. No command is issued yet.
    pub fn new(pipette: &'p Pipette, policy: TipPolicy) -> Self {
        Self {
            pipette,
            policy,
            holding: false,
            last_destination: None,
        }
    }

    /// Policy this session applies.
    pub fn policy(&self) -> TipPolicy {
        self.policy
    }

    /// Get the pipette ready for a transfer into `destination`.
    ///
    /// Returns `true` when the transfer itself should pick up and drop a
    /// fresh tip.
    pub fn prepare<D: Driver + ?Sized>(&mut self, driver: &mut D, destination: Location) -> Result<bool, DriverError> {
        match self.policy {
            TipPolicy::Always => return Ok(true),
            TipPolicy::Never => {}
            TipPolicy::ReuseUntilDestinationChanges => {
                if self.holding && self.last_destination != Some(destination) {
                    debug!(
                        "{} pipette: destination changed to {}, changing tip",
                        self.pipette.mount(),
                        destination
                    );
                    self.pipette.drop_tip(driver)?;
                    self.holding = false;
                }
            }
        }

        if !self.holding {
            self.pipette.pick_up_tip(driver)?;
            self.holding = true;
        }
        self.last_destination = Some(destination);
        Ok(false)
    }

    /// Drop any tip still held.
    pub fn finish<D: Driver + ?Sized>(self, driver: &mut D) -> Result<(), DriverError> {
        if self.holding {
            self.pipette.drop_tip(driver)?;
        }
        Ok(())
    }
}
