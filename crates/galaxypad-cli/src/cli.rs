//! CLI argument definitions for galaxypad.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "galaxypad")]
#[command(about = "Record Super Mario Galaxy 2 ghost inputs from Dolphin", version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Args {
    /// Folder the PAD files are written to (one subfolder per level)
    #[arg(required = true, value_name = "OUTPUT_FOLDER")]
    pub output_folder: Option<PathBuf>,

    /// Address of the PadRecorderInfo pointer (hex)
    #[arg(short, long, default_value = "0x80003FFC", env = "GALAXYPAD_ADDRESS")]
    pub address: String,

    /// GameData.bin to embed in every file
    #[arg(long, value_name = "FILE")]
    pub save_data: Option<PathBuf>,

    /// Player slot in the save data (1-based, default 1)
    #[arg(long, value_name = "N", requires = "save_data", value_parser = clap::value_parser!(u32).range(1..))]
    pub save_index: Option<u32>,

    /// File name prefix, followed by the spawn ID
    #[arg(long, default_value = "Dreamer")]
    pub base_name: String,

    /// Delay between memory polls in milliseconds
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Abort if the game is not a known SMG2 build
    #[arg(long)]
    pub strict: bool,

    /// Offset of a frame-history ring pointer inside RecordInfo (hex)
    #[arg(long, value_name = "HEX", requires = "history_capacity")]
    pub history_offset: Option<String>,

    /// Number of entries in the frame-history ring
    #[arg(long, value_name = "N", requires = "history_offset")]
    pub history_capacity: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a PAD file and print a summary
    Inspect {
        /// PAD file to read
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
