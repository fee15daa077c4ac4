use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod check;
mod plan;
mod wells;

/// liquidplan - plan and check liquid-handling workflows
#[derive(Parser)]
#[command(name = "liquidplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How a plan is written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered command listing
    #[default]
    Text,
    /// JSON document with workflow name, timestamp, stats and commands
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a workflow file and print the command sequence
    Plan {
        /// Workflow TOML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,

        /// Write the plan here instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Run every check on a workflow file and report all problems
    Check {
        /// Workflow TOML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the wells a sample count covers, in pipetting order
    Wells {
        /// Number of samples on the plate
        #[arg(short, long)]
        count: usize,

        /// Wells to leave out (e.g. A3 B7)
        #[arg(short, long, num_args = 1..)]
        skip: Vec<String>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Plan { file, format, output } => plan::run(file, format, output),
        Commands::Check { file } => check::run(file),
        Commands::Wells { count, skip } => wells::run(count, skip),
    }
}
