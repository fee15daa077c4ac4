//! # liquidplan - Transfer Planning for Liquid-Handling Robots
//!
//! `liquidplan` turns a workflow description (a TOML section plus an optional
//! CSV transfer table) into the ordered command sequence a single-arm
//! pipetting robot executes: load labware, pick up tips, aspirate, dispense,
//! wait on a magnet.
//!
//! ## Key Features
//!
//! - **Validate first**: every option, volume and deck reference is checked
//!   before the first command is issued. A plan that fails issues nothing.
//!
//! - **Tool selection**: volumes are routed to the small or the large pipette
//!   by a single threshold, with per-pass bounds.
//!
//! - **Tip policies**: tips are changed per record, kept for a whole pass, or
//!   kept until the destination changes, depending on what the pass moves and
//!   whether the destination plate is clean.
//!
//! - **Driver seam**: workflows talk to a [`driver::Driver`]. The bundled
//!   [`driver::CommandLog`] records commands and rejects tip mistakes, so a
//!   plan can be checked or exported without hardware.
//!
//! ## Quick Start
//!
//! ```rust
//! use liquidplan::config::Config;
//! use liquidplan::driver::CommandLog;
//! use liquidplan::protocols::plan_workflow;
//!
//! let config = Config::from_str(r#"
//!     [pool]
//!     table = """
//!     source_slot,source_well,tube_well,vol_dna
//!     3,A1,A1,5
//!     3,A2,A1,5
//!     """
//! "#)?;
//!
//! let mut log = CommandLog::new();
//! plan_workflow(&config.workflow()?, &mut log)?;
//! assert_eq!(log.stats().tip_pickups, 1);
//! # Ok::<(), liquidplan::PlanError>(())
//! ```
//!
//! ## Workflows
//!
//! | Section | What it does |
//! |---------|--------------|
//! | `standardize` | Water then DNA into destination plates to equalize concentrations |
//! | `pool` | Sample wells combined into tubes of a 24-position block |
//! | `distribute` | Master mix from one tube into every sample well |
//! | `ligation` | Barcode adapters, then master mix from a cooled tube |
//! | `cleanup` | Magnetic bead cleanup with two ethanol washes on a multi-channel |
//!
//! ## Architecture
//!
//! - [`config`]: TOML workflow files and option limits
//! - [`table`]: positional CSV transfer tables
//! - [`labware`]: slots, wells, plate models, mounts
//! - [`planner`]: tool selection, tip policies, wash batching
//! - [`driver`]: commands, the driver trait, the recording driver
//! - [`protocols`]: the workflows themselves
//! - [`report`]: collect every validation problem of a workflow at once
//! - [`export`]: planned commands as JSON or text

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod labware;
pub mod planner;
pub mod protocols;
pub mod report;
pub mod table;

pub use error::{PlanError, Result};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, WorkflowConfig};
    pub use crate::driver::{Command, CommandLog, Driver, DriverError, PlanStats, Target};
    pub use crate::error::{PlanError, Result};
    pub use crate::export::PlanExport;
    pub use crate::labware::{Location, Mount, PlateStatus, PlateType, Slot, WellName};
    pub use crate::planner::{decide_tip_policy, TipPolicy, ToolId, ToolSet, TransferPass, VolumeBounds};
    pub use crate::protocols::{plan_workflow, validate_workflow, Workflow};
    pub use crate::report::{check_workflow, PlanReport};
    pub use crate::table::{TableLayout, TransferRecord, TransferTable};
}
