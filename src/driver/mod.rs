//! # Hardware Driver Seam
//!
//! Workflows never talk to a robot directly. They issue [`Command`] values to
//! something implementing [`Driver`], one at a time, in order. The crate ships
//! [`CommandLog`], a recording driver that also tracks tip state so a plan
//! that would pick up a second tip or pipette without one is rejected before
//! it reaches hardware.
//!
//! [`Pipette`] wraps a mount and a volume range and expands compound steps
//! (a transfer with touch-tip and blow-out, for instance) into primitive
//! commands.

mod command;
mod recorder;
mod pipette;
mod stats;

pub use command::{Command, Target, WellPosition};
pub use recorder::CommandLog;
pub use pipette::{Pipette, TransferOptions};
pub use stats::PlanStats;

use crate::labware::Mount;

/// Errors raised by a driver when a command cannot be carried out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// No pipette is attached to the mount
    #[error("No instrument loaded on {0} mount")]
    NoInstrument(Mount),

    /// Pick-up requested while a tip is already attached
    #[error("{0} pipette already has a tip attached")]
    TipAlreadyAttached(Mount),

    /// Liquid handling or tip disposal without a tip
    #[error("{0} pipette has no tip attached")]
    NoTipAttached(Mount),

    /// The driver refused the command for another reason
    #[error("Command rejected: {0}")]
    Rejected(String),
}

/// Receiver of planned commands.
///
/// Implementations execute (or record) each command as it arrives. Returning
/// an error aborts the workflow.
pub trait Driver {
    /// Carry out one command.
    fn execute(&mut self, command: Command) -> Result<(), DriverError>;
}

impl<D: Driver + ?Sized> Driver for &mut D {
    fn execute(&mut self, command: Command) -> Result<(), DriverError> {
        (**self).execute(command)
    }
}
