//! Core CLI definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bininfo")]
#[command(about = "Inspect TOSB BIN modules", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub decode: DecodeArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Decoder overrides, applied on top of the config file
#[derive(Args, Debug, Default)]
pub struct DecodeArgs {
    /// Maximum records decoded from one patch table
    #[arg(long, env = "BININFO_MAX_RECORDS", global = true)]
    pub max_records: Option<usize>,

    /// Address blocks carry a name before their entries
    #[arg(long, env = "BININFO_NAMED_ADDRESS_BLOCKS", global = true)]
    pub named_address_blocks: Option<bool>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the header and the decoded patch table
    #[command(visible_alias = "s")]
    Show {
        /// Path to .BIN file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the header only
    #[command(visible_alias = "h")]
    Header {
        /// Path to .BIN file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List relocations, imports, exports and allocations
    #[command(visible_alias = "u")]
    Summary {
        /// Path to .BIN file
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configure default decoder settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default record limit
        #[arg(long)]
        max_records: Option<usize>,

        /// Set whether address blocks carry a name
        #[arg(long)]
        named_address_blocks: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
