//! # liquidplan
//!
//! Command-line front end for planning and checking liquid-handling
//! workflows.
//!
//! ## Usage
//!
//! ```bash
//! # Print the command sequence of a workflow
//! liquidplan plan cleanup.toml
//!
//! # Save it as JSON
//! liquidplan plan standardize.toml --format json --output plan.json
//!
//! # Report every problem in a workflow file
//! liquidplan check pool.toml
//!
//! # Show the wells 30 samples cover, skipping two
//! liquidplan wells --count 30 --skip A3 B7
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
