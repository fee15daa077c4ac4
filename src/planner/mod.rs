//! # Transfer Planner
//!
//! The decisions shared by every workflow:
//!
//! 1. **Tool selection**: which pipette takes a volume, and whether the
//!    volume is legal at all ([`ToolSet::select_tool`], [`VolumeBounds`]).
//! 2. **Tip policy**: when a pipette changes tips ([`decide_tip_policy`],
//!    [`TipSession`]).
//! 3. **Batching**: how plate columns are grouped for washes and how long
//!    each group soaks ([`group_for_batch`], [`WashSchedule`]).
//!
//! [`validate_records`] runs tool selection over a whole table up front, so a
//! bad volume anywhere aborts the plan before the first command is issued.

mod batch;
mod tips;
mod tools;


pub use batch::{group_for_batch, soak_seconds, WashSchedule, AIR_DRY_SECONDS, DEFAULT_BATCH_SIZE};
pub use tips::{decide_tip_policy, TipPolicy, TipSession, TransferPass};
pub use tools::{ToolId, ToolRange, ToolSet, VolumeBounds};

use crate::error::Result;
use crate::table::{round_volume, TransferRecord};

/// Tool assignment for one record of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedTransfer<'a> {
    /// The record.
    pub record: &'a TransferRecord,
    /// Volume this pass moves for the record, rounded to two decimals.
    pub volume: f64,
    /// Selected tool; `None` when the rounded volume is zero and the step
    /// is skipped.
    pub tool: Option<ToolId>,
}

/// Select a tool for every record of a pass, failing on the first illegal
/// volume.
///
/// `volume_of` picks the volume the pass moves (the DNA volume, the water
/// volume, ...). Records keep their table order.
///
/// A value just outside the bounds fails even when it would round inside
/// them: `200.004` is rejected against a 200 µL maximum.
pub fn validate_records<'a, F>(
    records: &'a [TransferRecord],
    tools: &ToolSet,
    bounds: VolumeBounds,
    pass: TransferPass,
    volume_of: F,
) -> Result<Vec<PlannedTransfer<'a>>>
where
    F: Fn(&TransferRecord) -> f64,
{
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let written = volume_of(record);
            let context = format!("{:?} record {} ({})", pass, i + 1, record.destination);
            // Bounds and tool choice use the value as written
            let tool = tools.select_tool(written, bounds, &context)?;
            let volume = round_volume(written);
            let tool = tool.filter(|_| volume > 0.0);
            Ok(PlannedTransfer { record, volume, tool })
        })
        .collect()
}
